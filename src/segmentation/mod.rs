mod backtracking;
mod contrast;
mod engine;
mod otsu;
mod raster;
mod region;
pub mod types;

pub use backtracking::{
    BacktrackingSearch, SearchState, StepOutcome, DEFAULT_MAX_ITERATIONS, INITIAL_STEP,
    INITIAL_THRESHOLD,
};
pub use contrast::{region_contrast, CONTRAST_EPSILON};
pub use engine::{EngineConfig, SegmentationEngine};
pub use otsu::{otsu_threshold, OtsuSolver};
pub use raster::{Raster, BACKGROUND, FOREGROUND};
pub use region::{EdgeThresholds, Partition, RegionMetrics};
pub use types::{
    BacktrackingAnalytics, OtsuAnalytics, SegmentationResult, StrategyAnalytics,
    ThresholdObjective, ThresholdStrategy, TrajectoryPoint,
};
