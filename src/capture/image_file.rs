use super::RasterSource;
use crate::segmentation::Raster;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// File extensions accepted as input, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Image file on disk, decoded and converted to luma on load.
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !is_supported_extension(path) {
            bail!(
                "Invalid file type: {} (expected one of {})",
                path.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

}

impl RasterSource for ImageFileSource {
    fn load(&mut self) -> Result<Raster> {
        let _span = tracing::debug_span!("load_image").entered();
        tracing::info!("Reading image from {}", self.path.display());

        let image = image::open(&self.path)
            .with_context(|| format!("Could not read image file {}", self.path.display()))?;

        let raster = Raster::from_dynamic(&image)
            .with_context(|| format!("Unusable image {}", self.path.display()))?;

        tracing::info!("Loaded {}x{} raster", raster.width(), raster.height());
        Ok(raster)
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported_extension(Path::new("a/b.PNG")));
        assert!(is_supported_extension(Path::new("photo.JpEg")));
        assert!(is_supported_extension(Path::new("anim.gif")));
        assert!(!is_supported_extension(Path::new("scan.tiff")));
        assert!(!is_supported_extension(Path::new("noext")));
    }

    #[test]
    fn rejects_unsupported_extension_before_reading() {
        assert!(ImageFileSource::new("missing.bmp").is_err());
    }

    #[test]
    fn loads_png_as_luma() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        RgbImage::from_pixel(4, 3, Rgb([255, 0, 0])).save(&path).unwrap();

        let mut source = ImageFileSource::new(&path).unwrap();
        let raster = source.load().unwrap();
        assert_eq!((raster.width(), raster.height()), (4, 3));
        assert!(raster.samples().iter().all(|&v| v == 76));
        assert_eq!(source.name(), "input.png");
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let err = ImageFileSource::new(&path).unwrap().load().unwrap_err();
        assert!(err.to_string().contains("Could not read image file"));
    }
}
