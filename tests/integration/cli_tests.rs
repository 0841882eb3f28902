use clap::Parser;
use dupepair::cli::Cli;
use dupepair::error::ExitCode;
use dupepair::run_app_with_output;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> (ExitCode, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let code = run_app_with_output(cli, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

fn scenario(base: &Path) -> (String, String) {
    let a = base.join("A");
    let b = base.join("B");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("f1"), "content1").unwrap();
    fs::write(a.join("f2"), "content2").unwrap();
    fs::write(b.join("f3"), "content1").unwrap();
    fs::write(b.join("f4"), "content3").unwrap();
    (
        a.to_string_lossy().into_owned(),
        b.to_string_lossy().into_owned(),
    )
}

#[test]
fn test_no_paths_prints_usage_and_succeeds() {
    let (code, out) = run(&["dupepair"]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.contains("Exact duplicate file finder"));
    assert!(out.contains("Usage: dupepair [OPTIONS] [PATH]..."));
}

#[test]
fn test_text_output_for_scenario() {
    let base = tempdir().unwrap();
    let (a, b) = scenario(base.path());

    let (code, out) = run(&["dupepair", &a, &b]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(out, format!("{a}/f1, {b}/f3\n"));
}

#[test]
fn test_json_output_for_scenario() {
    let base = tempdir().unwrap();
    let (a, b) = scenario(base.path());

    let (_, out) = run(&["dupepair", "--output", "json", &a, &b]);
    let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();

    assert_eq!(value["first"], format!("{a}/f1"));
    assert_eq!(value["second"], format!("{b}/f3"));
}

#[test]
fn test_csv_output_without_duplicates_has_header_only() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only"), "x").unwrap();

    let (code, out) = run(&["dupepair", "-o", "csv", &dir.path().to_string_lossy()]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(out, "first,second\n");
}

#[test]
fn test_missing_root_gives_partial_success() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "dup").unwrap();
    fs::write(dir.path().join("b"), "dup").unwrap();
    let missing = dir.path().join("missing");

    let (code, out) = run(&[
        "dupepair",
        &missing.to_string_lossy(),
        &dir.path().to_string_lossy(),
    ]);

    assert_eq!(code, ExitCode::PartialSuccess);
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn test_config_file_ignore_patterns_are_applied() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), "dup").unwrap();
    fs::write(data.join("b.tmp"), "dup").unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"ignore_patterns": ["*.tmp"], "jobs": 2}"#).unwrap();

    let (code, out) = run(&[
        "dupepair",
        "--config",
        &config.to_string_lossy(),
        &data.to_string_lossy(),
    ]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.is_empty());
}
