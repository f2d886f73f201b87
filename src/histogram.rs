//! Intensity histograms and the summary statistics derived from them.

use crate::error::{Result, SegmentationError};
use crate::segmentation::Raster;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Number of intensity levels in an 8-bit raster.
pub const BINS: usize = 256;

/// 256-bin intensity histogram; index is the intensity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; BINS],
}

/// Count, mean and population standard deviation of a set of levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelStats {
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Summary of a histogram: moments plus local extrema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramAnalysis {
    pub mean: f64,
    pub std_dev: f64,
    pub peaks: Vec<u8>,
    pub valleys: Vec<u8>,
    pub histogram: Vec<u64>,
}

impl Histogram {
    /// One increment per pixel; the total always equals the pixel count.
    pub fn from_raster(raster: &Raster) -> Self {
        Self::from_samples(raster.samples())
    }

    pub fn from_samples(samples: &[u8]) -> Self {
        let mut counts = [0u64; BINS];
        for &sample in samples {
            counts[sample as usize] += 1;
        }
        Self { counts }
    }

    pub fn from_counts(counts: [u64; BINS]) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u64; BINS] {
        &self.counts
    }

    pub fn count(&self, level: u8) -> u64 {
        self.counts[level as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Pixels with intensity strictly above `threshold`.
    pub fn count_above(&self, threshold: u8) -> u64 {
        self.counts[threshold as usize + 1..].iter().sum()
    }

    /// Statistics over the given inclusive level range, `None` when it holds no pixels.
    pub fn stats(&self, levels: RangeInclusive<u8>) -> Option<LevelStats> {
        let (start, end) = (*levels.start() as usize, *levels.end() as usize);
        if start > end {
            return None;
        }
        let bins = &self.counts[start..=end];

        let count: u64 = bins.iter().sum();
        if count == 0 {
            return None;
        }

        let weighted: f64 = bins
            .iter()
            .enumerate()
            .map(|(offset, &c)| (start + offset) as f64 * c as f64)
            .sum();
        let mean = weighted / count as f64;

        let variance: f64 = bins
            .iter()
            .enumerate()
            .map(|(offset, &c)| {
                let d = (start + offset) as f64 - mean;
                d * d * c as f64
            })
            .sum::<f64>()
            / count as f64;

        Some(LevelStats {
            count,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Mean, population standard deviation, and strict local peaks/valleys.
    ///
    /// Bins 0 and 255 are never classified, and a bin equal to either
    /// neighbour is neither a peak nor a valley.
    pub fn analyze(&self) -> Result<HistogramAnalysis> {
        let _span = tracing::debug_span!("histogram_analysis").entered();

        let stats = self.stats(0..=u8::MAX).ok_or_else(|| {
            SegmentationError::InvalidInput("histogram has no samples".to_string())
        })?;

        let mut peaks = Vec::new();
        let mut valleys = Vec::new();
        for i in 1..BINS - 1 {
            let (prev, here, next) = (self.counts[i - 1], self.counts[i], self.counts[i + 1]);
            if here > prev && here > next {
                peaks.push(i as u8);
            } else if here < prev && here < next {
                valleys.push(i as u8);
            }
        }

        tracing::debug!(
            "histogram: mean={:.2}, std_dev={:.2}, {} peaks, {} valleys",
            stats.mean,
            stats.std_dev,
            peaks.len(),
            valleys.len()
        );

        Ok(HistogramAnalysis {
            mean: stats.mean,
            std_dev: stats.std_dev,
            peaks,
            valleys,
            histogram: self.counts.to_vec(),
        })
    }
}
