mod image_file;

pub use image_file::{is_supported_extension, ImageFileSource, SUPPORTED_EXTENSIONS};

use crate::segmentation::Raster;
use anyhow::Result;

/// Trait for raster sources
pub trait RasterSource {
    /// Load the grayscale raster
    fn load(&mut self) -> Result<Raster>;

    /// Human-readable name of the source, used in reports
    fn name(&self) -> String;
}
