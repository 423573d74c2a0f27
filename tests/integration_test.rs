//! Integration tests for rtcontrol
//!
//! These tests drive complete invocations through the library: command-line
//! parsing, configuration from a temporary directory, a JSON snapshot source
//! and a scripted prompt.

use std::fs;
use std::path::{Path, PathBuf};

use rtcontrol::{
    ControlError,
    cli::{Cli, fields_help},
    config::ControlConfig,
    control::{Controller, RunSummary},
    fields::FieldRegistry,
    filters,
    source::{SnapshotSource, TorrentRecord},
    ui::{Confirmation, MockPrompt},
};
use serde_json::json;
use tempfile::TempDir;

/// Write a snapshot with five torrents and return its path
fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("snapshot.json");
    let torrents = json!([
        {"hash": "E1", "name": "echo", "alias": "PUB", "size": 500, "ratio": 0.2, "is_open": true},
        {"hash": "D1", "name": "delta", "alias": "PUB", "size": 4000, "ratio": 1.5, "is_open": true},
        {"hash": "C1", "name": "charlie", "alias": "PRV", "size": 3000, "ratio": 2.0, "is_open": true},
        {"hash": "B1", "name": "bravo", "alias": "PRV", "size": 2000, "ratio": 0.9},
        {"hash": "A1", "name": "alpha", "alias": "PUB", "size": 1000, "ratio": 0.5, "is_complete": true}
    ]);
    fs::write(&path, serde_json::to_string_pretty(&torrents).unwrap()).unwrap();
    path
}

/// Same steps as the binary, with a scripted prompt and captured output
fn execute(cli: &Cli, prompt: &mut MockPrompt, out: &mut Vec<u8>) -> Result<RunSummary, ControlError> {
    let registry = FieldRegistry::torrent();
    let config = ControlConfig::load(cli.config_dir.as_deref())?;
    let options = cli.options().build(&config, &registry)?;
    let matcher = filters::parse_conditions(options.filters(), &registry)?;
    let source = SnapshotSource::open(cli.source.as_ref().unwrap())?;

    let mut confirm = Confirmation::new(prompt)
        .interactive(options.interactive())
        .assume_yes(cli.yes);
    Controller::new(&options, &registry).run(&source, &matcher, &mut confirm, out)
}

/// Run rtcontrol with `args` against the snapshot in `dir`
fn run_in(dir: &TempDir, args: &[&str], prompt: &mut MockPrompt) -> (Result<RunSummary, ControlError>, String) {
    let config_dir = dir.path().to_string_lossy().to_string();
    let snapshot = dir.path().join("snapshot.json").to_string_lossy().to_string();

    let mut argv = vec!["rtcontrol", "--config-dir", config_dir.as_str(), "--source", snapshot.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from_args(argv).unwrap();

    let mut out = Vec::new();
    let result = execute(&cli, prompt, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn records(dir: &TempDir) -> Vec<TorrentRecord> {
    SnapshotSource::open(dir.path().join("snapshot.json")).unwrap().records()
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());
    dir
}

#[test]
fn test_list_with_field_list() {
    let dir = setup();
    let (result, out) = run_in(&dir, &["-o", "name,ratio", "ratio=+1"], &mut MockPrompt::default());

    let summary = result.unwrap();
    assert_eq!((summary.matched, summary.total), (2, 5));
    assert_eq!(out, "charlie\t2.0\ndelta\t1.5\n");
}

#[test]
fn test_default_sort_is_by_name() {
    let dir = setup();
    let (result, out) = run_in(&dir, &["-o", "name", "alias=PUB"], &mut MockPrompt::default());
    result.unwrap();
    assert_eq!(out, "alpha\ndelta\necho\n");
}

#[test]
fn test_reverse_size_sort_with_template() {
    let dir = setup();
    let (result, out) = run_in(
        &dir,
        &["-s", "size", "-r", "-o", r"$(name)s=$(size.sz)s\t$(is_open)s", "*"],
        &mut MockPrompt::default(),
    );
    result.unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "delta=3.9 KiB\tOPN");
    assert_eq!(lines[4], "echo=500.0 B\tOPN");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_stop_is_saved() {
    let dir = setup();
    let (result, out) = run_in(&dir, &["--stop", "-o", "-", "alias=PUB", "is_open=yes"], &mut MockPrompt::default());

    let summary = result.unwrap();
    assert_eq!(summary.acted, 2);
    assert!(out.is_empty());

    let open: Vec<_> = records(&dir)
        .into_iter()
        .filter(|r| r.is_open)
        .map(|r| r.name)
        .collect();
    assert_eq!(open, ["charlie"]);
}

#[test]
fn test_dry_run_delete_changes_nothing() {
    let dir = setup();
    let (result, out) = run_in(
        &dir,
        &["--delete", "--dry-run", "--yes", "-o", "$(action)s $(name)s", "ratio=-1"],
        &mut MockPrompt::default(),
    );

    let summary = result.unwrap();
    assert_eq!(summary.matched, 3);
    assert_eq!(summary.acted, 0);
    assert_eq!(out, "DELETE alpha\nDELETE bravo\nDELETE echo\n");
    assert_eq!(records(&dir).len(), 5);
}

#[test]
fn test_delete_asks_for_each_item() {
    let dir = setup();
    let mut prompt = MockPrompt::answering([true, false]);
    let (result, _) = run_in(&dir, &["--delete", "-o", "-", "alias=PRV"], &mut prompt);

    let summary = result.unwrap();
    assert_eq!((summary.acted, summary.skipped), (1, 1));
    assert_eq!(prompt.questions(), ["DELETE item bravo", "DELETE item charlie"]);

    let names: Vec<_> = records(&dir).into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["echo", "delta", "charlie", "alpha"]);
}

#[test]
fn test_cancelled_prompt_keeps_earlier_changes() {
    let dir = setup();
    let mut prompt = MockPrompt::answering([true]);
    let (result, _) = run_in(&dir, &["--delete", "-o", "-", "ratio=-1"], &mut prompt);

    assert!(matches!(result.unwrap_err(), ControlError::Prompt(_)));
    assert_eq!(prompt.questions(), ["DELETE item alpha", "DELETE item bravo"]);

    let names: Vec<_> = records(&dir).into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["echo", "delta", "charlie", "bravo"]);
}

#[test]
fn test_ignore_flag_is_saved() {
    let dir = setup();
    let (result, out) = run_in(&dir, &["--ignore", "1", "alpha,bravo"], &mut MockPrompt::default());

    result.unwrap();
    assert_eq!(out, "  IGNORE A1 alpha\n  IGNORE B1 bravo\n");
    let ignored: Vec<_> = records(&dir)
        .into_iter()
        .filter(|r| r.is_ignored)
        .map(|r| r.hash)
        .collect();
    assert_eq!(ignored, ["B1", "A1"]);
}

#[test]
fn test_config_file_defaults() {
    let dir = setup();
    fs::write(
        dir.path().join("config.toml"),
        "sort_fields = \"size\"\noutput_format = \"name,size\"\n",
    )
    .unwrap();

    let (result, out) = run_in(&dir, &["alias=PRV"], &mut MockPrompt::default());
    result.unwrap();
    assert_eq!(out, "bravo\t2000\ncharlie\t3000\n");
}

#[test]
fn test_nul_terminated_output() {
    let dir = setup();
    let (result, out) = run_in(&dir, &["-0", "-o", "hash", "is_complete=yes"], &mut MockPrompt::default());
    result.unwrap();
    assert_eq!(out, "A1\0");
}

#[test]
fn test_errors_before_any_change() {
    let dir = setup();

    let (result, _) = run_in(&dir, &["--start", "--delete", "*"], &mut MockPrompt::default());
    let err = result.unwrap_err();
    assert!(err.is_usage());
    assert_eq!(err.to_string(), "Options --start and --delete are mutually exclusive");

    let (result, _) = run_in(&dir, &["--start", "-s", "nope", "*"], &mut MockPrompt::default());
    assert_eq!(result.unwrap_err().exit_code(), 1);

    let (result, _) = run_in(&dir, &["--start", "nope=1"], &mut MockPrompt::default());
    assert!(matches!(result.unwrap_err(), ControlError::Filter(_)));

    let (result, _) = run_in(&dir, &[], &mut MockPrompt::default());
    assert!(matches!(result.unwrap_err(), ControlError::Usage(_)));

    assert!(records(&dir).iter().all(|r| !r.is_ignored));
    assert_eq!(records(&dir).iter().filter(|r| r.is_open).count(), 3);
}

#[test]
fn test_help_fields_wins_over_filters() {
    let cli = Cli::try_parse_from_args(["rtcontrol", "--help-fields", "ratio=+1"]).unwrap();
    assert!(cli.help_fields);

    let help = fields_help(&FieldRegistry::torrent());
    for (name, _) in FieldRegistry::torrent().all() {
        assert!(help.contains(&format!("  {name:<21} ")));
    }
}
