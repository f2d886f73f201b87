use super::{image_file_name, report_file_name, ResultSink};
use crate::report::AnalysisReport;
use crate::segmentation::SegmentationResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes PNG masks and JSON reports into one directory.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the directory if it does not exist yet.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::debug!("Writing results to {}", dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

}

impl ResultSink for DirectorySink {
    fn write_image(&mut self, stem: &str, result: &SegmentationResult) -> Result<PathBuf> {
        let path = self.dir.join(image_file_name(stem, result.strategy));
        result.binary.save(&path).with_context(|| {
            format!(
                "Failed to write {} image to {}",
                result.strategy,
                path.display()
            )
        })?;

        tracing::info!("Wrote {} mask to {}", result.strategy, path.display());
        Ok(path)
    }

    fn write_report(&mut self, stem: &str, report: &AnalysisReport) -> Result<PathBuf> {
        let path = self.dir.join(report_file_name(stem));
        let json = report.to_json().context("Failed to serialize analysis report")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        tracing::info!("Wrote analysis report to {}", path.display());
        Ok(path)
    }
}
