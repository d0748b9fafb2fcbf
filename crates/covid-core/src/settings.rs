use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{ReportKind, RowPolicy};

/// Input file used when neither the CLI nor the last run names one.
pub const DEFAULT_INPUT_FILE: &str = "COVID-19-Faelle_7-Tage-Inzidenz_Deutschland.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Analyse the German 7-day COVID-19 incidence time series
#[derive(Parser, Debug, Clone)]
#[command(
    name = "covid-analyzer",
    about = "Analyse the German 7-day COVID-19 incidence time series",
    version
)]
pub struct Settings {
    /// Input CSV file (header line plus comma-separated rows)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory that saved reports are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print a single report and exit instead of starting the menu
    #[arg(long, value_parser = ["full", "monthly", "max"])]
    pub report: Option<String>,

    /// Also save the report produced by --report
    #[arg(long, requires = "report")]
    pub save: bool,

    /// Skip rows that fail to parse instead of aborting the load
    #[arg(long)]
    pub skip_invalid_rows: bool,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.covid-analyzer/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".covid-analyzer").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and fill in defaults. Nothing is written here; see
    /// [`Settings::persist_last_used`].
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_defaults(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over the persisted values.
        if !is_arg_explicitly_set(&matches, "input") {
            if let Some(v) = last.input {
                settings.input = Some(v);
            }
        }
        // NOTE: clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "output_dir") {
            if let Some(v) = last.output_dir {
                settings.output_dir = Some(v);
            }
        }

        Self::resolve_defaults(settings)
    }

    /// Remember the input and output directory for the next run.
    ///
    /// Call only after the input loaded, so a mistyped path is never kept.
    pub fn persist_last_used(&self) {
        self.persist_last_used_to(&LastUsedParams::config_path());
    }

    /// Same as [`Settings::persist_last_used`] with an explicit config path.
    /// A run with `--clear` leaves nothing behind.
    pub fn persist_last_used_to(&self, config_path: &Path) {
        if self.clear {
            return;
        }
        if let Err(e) = LastUsedParams::from(self).save_to(config_path) {
            tracing::debug!("Could not persist {}: {}", config_path.display(), e);
        }
    }

    /// Fill unset paths with their defaults and apply the `--debug` flag.
    fn resolve_defaults(mut settings: Settings) -> Settings {
        if settings.input.is_none() {
            settings.input = Some(PathBuf::from(DEFAULT_INPUT_FILE));
        }
        if settings.output_dir.is_none() {
            settings.output_dir = Some(PathBuf::from("."));
        }
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Input file, falling back to [`DEFAULT_INPUT_FILE`].
    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE))
    }

    /// Output directory, falling back to the working directory.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn row_policy(&self) -> RowPolicy {
        if self.skip_invalid_rows {
            RowPolicy::Skip
        } else {
            RowPolicy::Abort
        }
    }

    /// Report requested via `--report`, if any.
    pub fn report_kind(&self) -> Option<ReportKind> {
        self.report.as_deref().and_then(|r| r.parse().ok())
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            input: s.input.clone(),
            output_dir: s.output_dir.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            input: Some(PathBuf::from("/data/incidence.csv")),
            output_dir: Some(PathBuf::from("/reports")),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded, params);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["covid-analyzer"]);

        assert!(settings.input.is_none());
        assert!(settings.output_dir.is_none());
        assert!(settings.report.is_none());
        assert!(!settings.save);
        assert!(!settings.skip_invalid_rows);
        assert_eq!(settings.log_level, "WARNING");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert_eq!(settings.row_policy(), RowPolicy::Abort);
        assert_eq!(settings.input_path(), PathBuf::from(DEFAULT_INPUT_FILE));
        assert_eq!(settings.output_path(), PathBuf::from("."));
    }

    #[test]
    fn test_settings_cli_report_and_policy() {
        let settings = Settings::parse_from([
            "covid-analyzer",
            "--report",
            "monthly",
            "--save",
            "--skip-invalid-rows",
        ]);
        assert_eq!(settings.report_kind(), Some(ReportKind::MonthlyAverage));
        assert!(settings.save);
        assert_eq!(settings.row_policy(), RowPolicy::Skip);
    }

    #[test]
    fn test_settings_rejects_unknown_report() {
        let result = Settings::try_parse_from(["covid-analyzer", "--report", "weekly"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_save_requires_report() {
        let result = Settings::try_parse_from(["covid-analyzer", "--save"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_paths() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            input: Some(PathBuf::from("remembered.csv")),
            output_dir: Some(PathBuf::from("remembered-out")),
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["covid-analyzer".into()], &config_path);
        assert_eq!(settings.input_path(), PathBuf::from("remembered.csv"));
        assert_eq!(settings.output_path(), PathBuf::from("remembered-out"));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            input: Some(PathBuf::from("remembered.csv")),
            output_dir: None,
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["covid-analyzer".into(), "--input".into(), "fresh.csv".into()],
            &config_path,
        );
        assert_eq!(settings.input_path(), PathBuf::from("fresh.csv"));
        assert_eq!(
            LastUsedParams::load_from(&config_path).input,
            Some(PathBuf::from("remembered.csv")),
            "loading settings must not overwrite the persisted values"
        );

        settings.persist_last_used_to(&config_path);
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.input, Some(PathBuf::from("fresh.csv")));
        assert_eq!(loaded.output_dir, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_load_with_last_used_writes_nothing() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["covid-analyzer".into(), "--input".into(), "typo.csv".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            input: Some(PathBuf::from("old.csv")),
            output_dir: None,
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["covid-analyzer".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.input_path(), PathBuf::from(DEFAULT_INPUT_FILE));

        settings.persist_last_used_to(&config_path);
        assert!(!config_path.exists(), "--clear must not write a new file");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["covid-analyzer".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
