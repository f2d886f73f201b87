use super::region::Partition;
use crate::histogram::Histogram;

/// Guards the contrast denominator when both regions are flat.
pub const CONTRAST_EPSILON: f64 = 1e-6;

/// Separability of the two regions produced by `threshold`:
/// `|mean_fg - mean_bg| / (std_fg + std_bg + eps)`.
///
/// Returns 0.0 when either region is empty.
pub fn region_contrast(histogram: &Histogram, threshold: u8) -> f64 {
    let partition = Partition::at_threshold(histogram, threshold);
    match (partition.foreground, partition.background) {
        (Some(fg), Some(bg)) => {
            (fg.mean - bg.mean).abs() / (fg.std_dev + bg.std_dev + CONTRAST_EPSILON)
        }
        _ => 0.0,
    }
}
