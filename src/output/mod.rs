mod directory;

pub use directory::DirectorySink;

use crate::report::AnalysisReport;
use crate::segmentation::SegmentationResult;
use anyhow::Result;
use std::path::PathBuf;

/// Trait for output destinations
pub trait ResultSink {
    /// Persist the binary image of one strategy, returning where it went
    fn write_image(&mut self, stem: &str, result: &SegmentationResult) -> Result<PathBuf>;

    /// Persist the analysis report
    fn write_report(&mut self, stem: &str, report: &AnalysisReport) -> Result<PathBuf>;
}

/// `<stem>_<strategy>.png`
pub fn image_file_name(stem: &str, strategy: &str) -> String {
    format!("{}_{}.png", stem, strategy)
}

/// `<stem>_analysis.json`
pub fn report_file_name(stem: &str) -> String {
    format!("{}_analysis.json", stem)
}
