use super::engine::SegmentationEngine;
use super::types::{
    OtsuAnalytics, SegmentationResult, StrategyAnalytics, ThresholdObjective, ThresholdStrategy,
};
use crate::histogram::Histogram;

/// Threshold with the largest between-class variance, and that variance.
///
/// Every level 0..=255 is tried; levels leaving one class empty are skipped.
/// Ties keep the lowest threshold. When no level splits the pixels (a single
/// populated bin) the result is `(0, 0.0)`.
pub fn otsu_threshold(histogram: &Histogram) -> (u8, f64) {
    let counts = histogram.counts();
    let total = histogram.total();
    if total == 0 {
        return (0, 0.0);
    }
    let total_f = total as f64;
    let weighted_total: f64 = counts
        .iter()
        .enumerate()
        .map(|(level, &c)| level as f64 * c as f64)
        .sum();

    let mut best_threshold = 0u8;
    let mut max_variance = 0.0f64;

    let mut below = 0u64;
    let mut weighted_below = 0.0f64;
    for (level, &count) in counts.iter().enumerate() {
        below += count;
        weighted_below += level as f64 * count as f64;
        let above = total - below;

        if below == 0 || above == 0 {
            continue;
        }

        let w1 = below as f64 / total_f;
        let w2 = above as f64 / total_f;
        let mean1 = weighted_below / below as f64;
        let mean2 = (weighted_total - weighted_below) / above as f64;

        let variance = w1 * w2 * (mean1 - mean2).powi(2);
        if variance > max_variance {
            max_variance = variance;
            best_threshold = level as u8;
        }
    }

    (best_threshold, max_variance)
}

/// Exhaustive between-class variance maximisation over the histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OtsuSolver;

impl ThresholdStrategy for OtsuSolver {
    fn name(&self) -> &'static str {
        "otsu"
    }

    fn segment(&self, engine: &SegmentationEngine) -> SegmentationResult {
        let _span = tracing::debug_span!("otsu").entered();

        let (threshold, between_class_variance) = otsu_threshold(engine.histogram());
        tracing::debug!(
            "otsu threshold={} between-class variance={:.4}",
            threshold,
            between_class_variance
        );

        let binary = engine.raster().binarize(threshold);
        let metrics = engine.metrics(threshold);

        SegmentationResult {
            strategy: self.name(),
            binary,
            threshold,
            analytics: StrategyAnalytics::Otsu(OtsuAnalytics {
                threshold,
                between_class_variance,
                metrics,
            }),
        }
    }
}
