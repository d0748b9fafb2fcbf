//! Interactive menu loop and the one-shot `--report` mode.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use covid_core::error::AnalyzerError;
use covid_core::models::{RecordSet, ReportKind};
use covid_data::reports;

use crate::export;

/// What a line typed at the menu prompt means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    Choice(i64),
    Exit,
    Invalid,
}

/// Interpret one line of menu input. `0`, `q`, `quit` and `exit` end the session.
pub fn parse_menu_input(line: &str) -> MenuInput {
    let trimmed = line.trim();
    if matches!(trimmed.to_lowercase().as_str(), "q" | "quit" | "exit") {
        return MenuInput::Exit;
    }
    match trimmed.parse::<i64>() {
        Ok(0) => MenuInput::Exit,
        Ok(n) => MenuInput::Choice(n),
        Err(_) => MenuInput::Invalid,
    }
}

/// `true` for an affirmative answer to the save prompt.
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "j" | "ja"
    )
}

/// A menu session over a loaded record set.
pub struct Session<'a, R, W> {
    records: &'a RecordSet,
    output_dir: PathBuf,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(records: &'a RecordSet, output_dir: PathBuf, input: R, output: W) -> Self {
        Self {
            records,
            output_dir,
            input,
            output,
        }
    }

    /// Run until the user picks exit or the input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                tracing::info!("Input closed; ending session");
                return Ok(());
            };

            match parse_menu_input(&line) {
                MenuInput::Exit => {
                    tracing::info!("Session ended by user");
                    return Ok(());
                }
                MenuInput::Invalid => writeln!(self.output, "Invalid input!")?,
                MenuInput::Choice(n) => {
                    match u32::try_from(n).ok().and_then(ReportKind::from_menu_choice) {
                        Some(kind) => self.show_report(kind)?,
                        None => writeln!(self.output, "Invalid option!")?,
                    }
                }
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        for kind in ReportKind::ALL {
            writeln!(self.output, "{} - {}", kind.menu_choice(), kind.description())?;
        }
        writeln!(self.output, "0 - Exit")?;
        write!(self.output, "> ")?;
        self.output.flush()
    }

    fn show_report(&mut self, kind: ReportKind) -> io::Result<()> {
        tracing::debug!("Rendering {} report", kind);

        let report = match reports::render(kind, self.records) {
            Ok(report) => report,
            Err(e) => {
                writeln!(self.output, "{}\n", e)?;
                return Ok(());
            }
        };

        writeln!(self.output, "{}", report)?;
        write!(self.output, "Save output as text file? (y/N) ")?;
        self.output.flush()?;

        let answer = self.read_line()?.unwrap_or_default();
        if is_yes(&answer) {
            match export::save_report(&self.output_dir, &report, Local::now().naive_local()) {
                Ok(path) => writeln!(self.output, "File '{}' saved successfully!\n", path.display())?,
                Err(e) => {
                    tracing::warn!("Saving report failed: {}", e);
                    writeln!(self.output, "Saving failed: {}\n", e)?;
                }
            }
        }

        Ok(())
    }

    /// Next input line without its line ending, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

/// Print one report to `out` and optionally save it, without a menu.
///
/// An empty record set for the max-incidence report is reported, not fatal.
pub fn run_single_report<W: Write>(
    kind: ReportKind,
    records: &RecordSet,
    output_dir: &Path,
    save: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let report = match reports::render(kind, records) {
        Ok(report) => report,
        Err(AnalyzerError::NoData) => {
            writeln!(out, "{}", AnalyzerError::NoData)?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    write!(out, "{}", report)?;

    if save {
        let path = export::save_report(output_dir, &report, Local::now().naive_local())?;
        writeln!(out, "File '{}' saved successfully!", path.display())?;
    }

    Ok(())
}
