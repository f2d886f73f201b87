use super::engine::SegmentationEngine;
use super::region::RegionMetrics;
use image::GrayImage;
use serde::Serialize;

/// Scores a candidate threshold for search strategies.
pub trait ThresholdObjective {
    /// Separability of the split at `threshold`
    fn contrast(&self, threshold: u8) -> f64;

    /// Region metrics of the split at `threshold`
    fn metrics(&self, threshold: u8) -> RegionMetrics;
}

/// Trait for threshold-selection strategies
/// Allows running different searches (backtracking, Otsu, ...) through one engine
pub trait ThresholdStrategy {
    /// Short identifier, also used for output file names
    fn name(&self) -> &'static str;

    /// Select a threshold and produce the binary image plus analytics
    fn segment(&self, engine: &SegmentationEngine) -> SegmentationResult;
}

/// One iteration of the backtracking search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub threshold: u8,
    pub contrast: f64,
    pub metrics: RegionMetrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktrackingAnalytics {
    /// Chronological record of visited thresholds
    pub trajectory: Vec<TrajectoryPoint>,
    pub best_threshold: u8,
    pub best_contrast: f64,
}

impl BacktrackingAnalytics {
    pub fn thresholds(&self) -> impl Iterator<Item = u8> + '_ {
        self.trajectory.iter().map(|p| p.threshold)
    }

    pub fn contrasts(&self) -> impl Iterator<Item = f64> + '_ {
        self.trajectory.iter().map(|p| p.contrast)
    }

    /// Last threshold the search visited.
    pub fn final_threshold(&self) -> Option<u8> {
        self.trajectory.last().map(|p| p.threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OtsuAnalytics {
    pub threshold: u8,
    pub between_class_variance: f64,
    pub metrics: RegionMetrics,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyAnalytics {
    Backtracking(BacktrackingAnalytics),
    Otsu(OtsuAnalytics),
}

/// Binary image plus the analytics of the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationResult {
    pub strategy: &'static str,
    pub binary: GrayImage,
    pub threshold: u8,
    pub analytics: StrategyAnalytics,
}

impl SegmentationResult {
    pub fn backtracking(&self) -> Option<&BacktrackingAnalytics> {
        match &self.analytics {
            StrategyAnalytics::Backtracking(analytics) => Some(analytics),
            StrategyAnalytics::Otsu(_) => None,
        }
    }

    pub fn otsu(&self) -> Option<&OtsuAnalytics> {
        match &self.analytics {
            StrategyAnalytics::Otsu(analytics) => Some(analytics),
            StrategyAnalytics::Backtracking(_) => None,
        }
    }
}
