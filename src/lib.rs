//! Binary threshold segmentation of grayscale images.
//!
//! A [`SegmentationEngine`] owns one luma raster and its 256-bin histogram and
//! offers two competing threshold searches: a greedy backtracking hill-climb
//! on region contrast and an exhaustive Otsu between-class variance search.
//! Both produce a two-level mask plus analytics for side-by-side comparison.

pub mod capture;
pub mod error;
pub mod histogram;
pub mod output;
pub mod report;
pub mod segmentation;

pub use error::SegmentationError;
pub use histogram::{Histogram, HistogramAnalysis};
pub use report::AnalysisReport;
pub use segmentation::{
    BacktrackingSearch, EngineConfig, OtsuSolver, Raster, RegionMetrics, SegmentationEngine,
    SegmentationResult, ThresholdStrategy,
};
