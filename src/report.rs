//! Serializable side-by-side comparison of the two strategies.

use crate::error::{Result, SegmentationError};
use crate::histogram::HistogramAnalysis;
use crate::output::image_file_name;
use crate::segmentation::{BacktrackingAnalytics, OtsuAnalytics, RegionMetrics, SegmentationResult};
use serde::Serialize;

/// Backtracking trajectory flattened into parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktrackingReport {
    pub thresholds: Vec<u8>,
    pub contrasts: Vec<f64>,
    /// Last visited threshold, from the untruncated trajectory
    pub final_threshold: Option<u8>,
    /// Threshold used for the binary image
    pub best_threshold: u8,
    /// Maximum contrast over the untruncated trajectory
    pub best_contrast: Option<f64>,
    pub metrics_history: Vec<RegionMetrics>,
}

impl BacktrackingReport {
    /// Keep the first `limit` trajectory entries; `None` keeps all of them.
    pub fn new(analytics: &BacktrackingAnalytics, limit: Option<usize>) -> Self {
        let keep = limit.unwrap_or(analytics.trajectory.len());
        let head = analytics.trajectory.iter().take(keep);

        let best_contrast = analytics
            .contrasts()
            .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |m| m.max(c))));

        Self {
            thresholds: head.clone().map(|p| p.threshold).collect(),
            contrasts: head.clone().map(|p| p.contrast).collect(),
            final_threshold: analytics.final_threshold(),
            best_threshold: analytics.best_threshold,
            best_contrast,
            metrics_history: head.map(|p| p.metrics).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub original_image: String,
    pub backtracking_image: String,
    pub otsu_image: String,
    pub histogram_analysis: HistogramAnalysis,
    pub backtracking_analysis: BacktrackingReport,
    pub otsu_analysis: OtsuAnalytics,
}

impl AnalysisReport {
    /// Assemble the report for an input named `original_image`.
    ///
    /// Image names follow the output naming scheme for the input's stem.
    pub fn new(
        original_image: &str,
        histogram_analysis: HistogramAnalysis,
        backtracking: &SegmentationResult,
        otsu: &SegmentationResult,
        trajectory_limit: Option<usize>,
    ) -> Result<Self> {
        let backtracking_analytics = backtracking.backtracking().ok_or_else(|| {
            SegmentationError::InvalidInput(format!(
                "expected a backtracking result, got {}",
                backtracking.strategy
            ))
        })?;
        let otsu_analytics = otsu.otsu().ok_or_else(|| {
            SegmentationError::InvalidInput(format!(
                "expected an otsu result, got {}",
                otsu.strategy
            ))
        })?;

        let stem = std::path::Path::new(original_image)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(original_image);

        Ok(Self {
            original_image: original_image.to_string(),
            backtracking_image: image_file_name(stem, backtracking.strategy),
            otsu_image: image_file_name(stem, otsu.strategy),
            histogram_analysis,
            backtracking_analysis: BacktrackingReport::new(
                backtracking_analytics,
                trajectory_limit,
            ),
            otsu_analysis: *otsu_analytics,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
