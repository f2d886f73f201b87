/// Errors returned by the segmentation core.
///
/// Empty foreground or background regions are not errors; they resolve to
/// fallback values (zero contrast, zero homogeneity, zero ratio).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SegmentationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
