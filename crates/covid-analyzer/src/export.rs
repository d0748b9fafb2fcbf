use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use covid_core::error::{AnalyzerError, Result};

/// File name for a report saved at `timestamp`:
/// `covid_analysis_<YYYYMMDDHHmmss>.txt`.
pub fn report_file_name(timestamp: NaiveDateTime) -> String {
    format!("covid_analysis_{}.txt", timestamp.format("%Y%m%d%H%M%S"))
}

/// Write `content` verbatim into `dir`, creating the directory if needed.
///
/// Returns the path of the written file.
pub fn save_report(dir: &Path, content: &str, timestamp: NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(report_file_name(timestamp));

    std::fs::create_dir_all(dir).map_err(|source| AnalyzerError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, content).map_err(|source| AnalyzerError::FileWrite {
        path: path.clone(),
        source,
    })?;

    tracing::info!("Saved report to {}", path.display());
    Ok(path)
}
