use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const HEADER: &str =
    "Meldedatum,Altersgruppe,Bevoelkerung,Faelle_gesamt,Faelle_neu,Faelle_7-Tage,Inzidenz_7-Tage";

fn write_csv(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("incidence.csv");
    let mut text = format!("{HEADER}\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn last_used(home: &Path) -> PathBuf {
    home.join(".covid-analyzer").join("last_used.json")
}

/// Run the binary with HOME redirected so no real settings are touched.
fn run(home: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_covid-analyzer"))
        .args(args)
        .env("HOME", home)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn covid-analyzer");

    // The process may exit before reading stdin (e.g. on a load error).
    if let Some(mut pipe) = child.stdin.take() {
        let _ = pipe.write_all(stdin.as_bytes());
    }

    child.wait_with_output().expect("wait for covid-analyzer")
}

#[test]
fn test_bad_population_aborts_with_non_zero_exit() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        &[
            "2021-01-01,A00-04,100,10,1,5,1.0",
            "2021-01-01,A00-04,abc,10,1,5,12.34",
        ],
    );

    let output = run(
        tmp.path(),
        &["--input", csv.to_str().unwrap(), "--report", "full"],
        "",
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("population"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_input_aborts_with_non_zero_exit() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.csv");

    let output = run(tmp.path(), &["--input", missing.to_str().unwrap()], "0\n");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read file"));
    assert!(!last_used(tmp.path()).exists());
}

#[test]
fn test_successful_load_remembers_input() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), &["2021-01-01,A00-04,100,10,1,5,1.0"]);

    let output = run(
        tmp.path(),
        &["--input", csv.to_str().unwrap(), "--report", "full"],
        "",
    );
    assert!(output.status.success());

    let saved = std::fs::read_to_string(last_used(tmp.path())).unwrap();
    assert!(saved.contains("incidence.csv"), "last_used.json: {saved}");

    // The remembered input is used when --input is omitted.
    let output = run(tmp.path(), &["--report", "full"], "");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("01.01.2021 A00-04"));
}

#[test]
fn test_skip_invalid_rows_keeps_good_rows() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        &[
            "2021-01-01,A00-04,100,10,1,5,1.0",
            "2021-01-01,A00-04,abc,10,1,5,12.34",
        ],
    );

    let output = run(
        tmp.path(),
        &[
            "--input",
            csv.to_str().unwrap(),
            "--report",
            "full",
            "--skip-invalid-rows",
        ],
        "",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("01.01.2021 A00-04"));
}

#[test]
fn test_interactive_session_exits_cleanly() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        &[
            "2021-01-01,d1,100,10,1,5,5.0",
            "2021-01-02,d2,100,10,1,5,5.0",
            "2021-01-03,d3,100,10,1,5,4.9",
        ],
    );
    let out_dir = tmp.path().join("reports");

    let output = run(
        tmp.path(),
        &[
            "--input",
            csv.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ],
        "x\n3\ny\n0\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid input!"));
    assert!(stdout.contains("01.01.2021 d1"));
    assert!(stdout.contains("02.01.2021 d2"));
    assert!(!stdout.contains("03.01.2021 d3"));

    let saved: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn test_max_report_on_empty_data_is_not_a_crash() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), &[]);

    let output = run(
        tmp.path(),
        &["--input", csv.to_str().unwrap(), "--report", "max"],
        "",
    );

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No data loaded"));
}
