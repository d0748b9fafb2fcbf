mod bootstrap;
mod export;
mod session;

use anyhow::{Context, Result};
use covid_core::settings::Settings;
use covid_data::reader::load_records;

use crate::session::{run_single_report, Session};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("COVID analyzer v{} starting", env!("CARGO_PKG_VERSION"));

    let input = settings.input_path();
    let output_dir = settings.output_path();
    tracing::info!(
        "Input: {}, output directory: {}, row policy: {:?}",
        input.display(),
        output_dir.display(),
        settings.row_policy()
    );

    // Any load failure ends the process here with a non-zero exit status.
    let (records, summary) = load_records(&input, settings.row_policy())
        .with_context(|| format!("Could not load data from {}", input.display()))?;
    settings.persist_last_used();

    if summary.short_lines > 0 {
        tracing::info!(
            "Ignored {} lines with too few fields",
            summary.short_lines
        );
    }
    if summary.invalid_rows > 0 {
        tracing::warn!("Skipped {} rows that failed to parse", summary.invalid_rows);
    }

    match settings.report_kind() {
        Some(kind) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            run_single_report(kind, &records, &output_dir, settings.save, &mut out)?;
        }
        None => {
            let stdin = std::io::stdin();
            let mut session = Session::new(&records, output_dir, stdin.lock(), std::io::stdout());
            session.run()?;
        }
    }

    Ok(())
}
