use super::raster::{Raster, FOREGROUND};
use crate::error::{Result, SegmentationError};
use crate::histogram::{Histogram, LevelStats};
use image::GrayImage;
use serde::Serialize;

/// Quality measures of one foreground/background split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionMetrics {
    pub foreground_ratio: f64,
    pub background_ratio: f64,
    pub foreground_homogeneity: f64,
    pub background_homogeneity: f64,
    /// Fraction of mask pixels the edge detector marks as boundary.
    pub edge_strength: f64,
}

/// Foreground and background statistics at a threshold.
///
/// Either side is `None` when no pixel falls into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    pub foreground: Option<LevelStats>,
    pub background: Option<LevelStats>,
}

impl Partition {
    /// Split by the `intensity > threshold` rule using histogram bins.
    pub fn at_threshold(histogram: &Histogram, threshold: u8) -> Self {
        let foreground = threshold
            .checked_add(1)
            .and_then(|first| histogram.stats(first..=u8::MAX));
        let background = histogram.stats(0..=threshold);
        Self {
            foreground,
            background,
        }
    }
}

/// Hysteresis thresholds for the edge detector run on binary masks.
///
/// Always finite, non-negative, and ordered `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeThresholds {
    low: f32,
    high: f32,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 100.0,
            high: 200.0,
        }
    }
}

impl EdgeThresholds {
    pub fn new(low: f32, high: f32) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low < 0.0 {
            return Err(SegmentationError::InvalidConfig(format!(
                "edge thresholds must be finite and non-negative (low={}, high={})",
                low, high
            )));
        }
        if high < low {
            return Err(SegmentationError::InvalidConfig(format!(
                "edge high threshold {} is below low threshold {}",
                high, low
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f32 {
        self.low
    }

    pub fn high(&self) -> f32 {
        self.high
    }
}

fn homogeneity(stats: Option<LevelStats>) -> f64 {
    stats.map_or(0.0, |s| 1.0 - s.std_dev / 255.0)
}

impl RegionMetrics {
    /// Measure a binary mask against the raster it was derived from.
    ///
    /// Pixels equal to `FOREGROUND` in the mask form the foreground; every
    /// other value is background. Edges are detected on the mask, not on the
    /// source intensities. The mask must have the raster's dimensions.
    pub fn measure(raster: &Raster, mask: &GrayImage, edges: EdgeThresholds) -> Result<Self> {
        let expected = (raster.width(), raster.height());
        if mask.dimensions() != expected {
            return Err(SegmentationError::InvalidInput(format!(
                "mask is {}x{}, raster is {}x{}",
                mask.width(),
                mask.height(),
                expected.0,
                expected.1
            )));
        }
        Ok(Self::tally(raster, mask, edges))
    }

    /// Binarize at `threshold` and measure the resulting mask.
    pub fn at_threshold(raster: &Raster, threshold: u8, edges: EdgeThresholds) -> Self {
        Self::tally(raster, &raster.binarize(threshold), edges)
    }

    // Caller guarantees matching dimensions.
    fn tally(raster: &Raster, mask: &GrayImage, edges: EdgeThresholds) -> Self {
        let _span = tracing::debug_span!("region_metrics").entered();

        let mut fg_levels = [0u64; crate::histogram::BINS];
        let mut bg_levels = [0u64; crate::histogram::BINS];
        for (&sample, &label) in raster.samples().iter().zip(mask.as_raw()) {
            if label == FOREGROUND {
                fg_levels[sample as usize] += 1;
            } else {
                bg_levels[sample as usize] += 1;
            }
        }
        let foreground = Histogram::from_counts(fg_levels).stats(0..=u8::MAX);
        let background = Histogram::from_counts(bg_levels).stats(0..=u8::MAX);

        let total = raster.pixel_count() as f64;
        let fg_count = foreground.map_or(0, |s| s.count) as f64;
        let bg_count = background.map_or(0, |s| s.count) as f64;

        let edge_map = imageproc::edges::canny(mask, edges.low, edges.high);
        let edge_pixels = edge_map.iter().filter(|&&v| v > 0).count() as f64;

        Self {
            foreground_ratio: fg_count / total,
            background_ratio: bg_count / total,
            foreground_homogeneity: homogeneity(foreground),
            background_homogeneity: homogeneity(background),
            edge_strength: edge_pixels / total,
        }
    }
}
