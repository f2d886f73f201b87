use super::backtracking::BacktrackingSearch;
use super::contrast::region_contrast;
use super::otsu::OtsuSolver;
use super::raster::Raster;
use super::region::{EdgeThresholds, RegionMetrics};
use super::types::{SegmentationResult, ThresholdObjective, ThresholdStrategy};
use crate::error::Result;
use crate::histogram::{Histogram, HistogramAnalysis};
use image::{DynamicImage, GrayImage};

/// Tunables for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Low hysteresis threshold of the edge detector used for `edge_strength`
    pub edge_low_threshold: f32,
    /// High hysteresis threshold of the edge detector used for `edge_strength`
    pub edge_high_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let edges = EdgeThresholds::default();
        Self {
            edge_low_threshold: edges.low(),
            edge_high_threshold: edges.high(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.edge_thresholds().map(|_| ())
    }

    pub fn edge_thresholds(&self) -> Result<EdgeThresholds> {
        EdgeThresholds::new(self.edge_low_threshold, self.edge_high_threshold)
    }
}

/// Owns a raster and its histogram and runs threshold strategies over them.
///
/// The histogram is built once at construction. Strategies only read from
/// the engine, so one engine can serve any number of segmentation calls.
#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    raster: Raster,
    histogram: Histogram,
    edges: EdgeThresholds,
}

impl SegmentationEngine {
    pub fn new(raster: Raster) -> Self {
        let histogram = {
            let _span = tracing::debug_span!("histogram").entered();
            Histogram::from_raster(&raster)
        };
        Self {
            raster,
            histogram,
            edges: EdgeThresholds::default(),
        }
    }

    pub fn with_config(raster: Raster, config: EngineConfig) -> Result<Self> {
        let edges = config.edge_thresholds()?;
        let mut engine = Self::new(raster);
        engine.edges = edges;
        Ok(engine)
    }

    /// Convert a decoded image to luma and build an engine around it.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        Ok(Self::new(Raster::from_dynamic(image)?))
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn histogram_analysis(&self) -> Result<HistogramAnalysis> {
        self.histogram.analyze()
    }

    /// Metrics of a binary mask of this engine's raster.
    ///
    /// Fails with `InvalidInput` when the mask size differs from the raster.
    pub fn measure(&self, mask: &GrayImage) -> Result<RegionMetrics> {
        RegionMetrics::measure(&self.raster, mask, self.edges)
    }

    pub fn segment_with<S: ThresholdStrategy + ?Sized>(&self, strategy: &S) -> SegmentationResult {
        strategy.segment(self)
    }

    pub fn backtracking_segmentation(&self, max_iterations: usize) -> SegmentationResult {
        self.segment_with(&BacktrackingSearch::new(max_iterations))
    }

    pub fn otsu_segmentation(&self) -> SegmentationResult {
        self.segment_with(&OtsuSolver)
    }
}

impl ThresholdObjective for SegmentationEngine {
    fn contrast(&self, threshold: u8) -> f64 {
        region_contrast(&self.histogram, threshold)
    }

    fn metrics(&self, threshold: u8) -> RegionMetrics {
        RegionMetrics::at_threshold(&self.raster, threshold, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentationError;
    use crate::segmentation::raster::{BACKGROUND, FOREGROUND};
    use approx::assert_abs_diff_eq;
    use image::Luma;

    fn split_engine() -> SegmentationEngine {
        let image = GrayImage::from_fn(16, 8, |x, _| Luma([if x < 8 { 50 } else { 200 }]));
        SegmentationEngine::new(Raster::new(image).unwrap())
    }

    #[test]
    fn rejects_inverted_edge_thresholds() {
        let raster = Raster::from_raw(2, 2, vec![0, 1, 2, 3]).unwrap();
        let config = EngineConfig {
            edge_low_threshold: 200.0,
            edge_high_threshold: 100.0,
        };
        let err = SegmentationEngine::with_config(raster, config).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidConfig(_)));
    }

    #[test]
    fn measure_rejects_foreign_mask() {
        let engine = split_engine();
        let err = engine.measure(&GrayImage::new(8, 8)).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidInput(_)));

        let own = engine.raster().binarize(100);
        let metrics = engine.measure(&own).unwrap();
        assert_eq!(metrics, engine.metrics(100));
    }

    #[test]
    fn histogram_is_built_once_from_raster() {
        let engine = split_engine();
        assert_eq!(engine.histogram().total(), 128);
        assert_eq!(engine.histogram().count(50), 64);
        assert_eq!(engine.histogram().count(200), 64);
    }

    #[test]
    fn otsu_separates_split_halves() {
        let engine = split_engine();
        let result = engine.otsu_segmentation();
        assert!(result.threshold >= 50 && result.threshold < 200);
        assert_eq!(result.binary.get_pixel(0, 0)[0], BACKGROUND);
        assert_eq!(result.binary.get_pixel(15, 0)[0], FOREGROUND);

        let otsu = result.otsu().unwrap();
        assert_abs_diff_eq!(otsu.metrics.foreground_ratio, 0.5);
        assert_abs_diff_eq!(otsu.metrics.background_ratio, 0.5);
    }

    #[test]
    fn backtracking_separates_split_halves() {
        let engine = split_engine();
        let result = engine.backtracking_segmentation(1000);
        assert!(result.threshold >= 50 && result.threshold < 200);

        let analytics = result.backtracking().unwrap();
        assert_eq!(analytics.best_threshold, result.threshold);
        assert!(analytics.best_contrast > 0.0);
        assert_eq!(result.binary.get_pixel(15, 7)[0], FOREGROUND);
    }

    #[test]
    fn uniform_raster_yields_trivial_results() {
        let engine = SegmentationEngine::new(Raster::from_raw(8, 8, vec![100; 64]).unwrap());

        let analysis = engine.histogram_analysis().unwrap();
        assert_abs_diff_eq!(analysis.mean, 100.0);
        assert_abs_diff_eq!(analysis.std_dev, 0.0);

        let otsu = engine.otsu_segmentation();
        assert_eq!(otsu.threshold, 0);
        assert!(otsu.binary.iter().all(|&v| v == FOREGROUND));

        let backtracking = engine.backtracking_segmentation(1000);
        let analytics = backtracking.backtracking().unwrap();
        assert_eq!(analytics.best_contrast, 0.0);
        assert_eq!(backtracking.threshold, 128);
    }
}
