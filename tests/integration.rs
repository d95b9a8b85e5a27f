//! Integration tests for combo-forge

use assert_cmd::Command;
use combo_forge::{
    enumerate::StatsSnapshot, Charset, EnumerationMode, Enumerator, FileReporter, GenerationConfig,
    ReportFormat, Reporter, RunOutcome, RunSummary, StopSignal,
};
use num_bigint::BigUint;
use parking_lot::Mutex;
use predicates::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reporter that keeps every snapshot it receives
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<StatsSnapshot>>>);

impl Reporter for Recorder {
    fn publish(&self, snapshot: &StatsSnapshot) -> combo_forge::Result<()> {
        self.0.lock().push(snapshot.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

fn config(output: &Path, symbols: &str, min_len: usize, max_len: usize) -> GenerationConfig {
    GenerationConfig {
        output: output.to_path_buf(),
        min_len,
        max_len,
        charset: Charset::custom(symbols).unwrap(),
        flush_every: 3,
        report_every: 5,
        ..Default::default()
    }
}

fn run(config: GenerationConfig) -> RunSummary {
    Enumerator::new(config, Box::new(Recorder::default()), StopSignal::new())
        .unwrap()
        .run(|_| {})
        .unwrap()
}

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

fn by_length(lines: &[String]) -> HashMap<usize, Vec<&String>> {
    let mut grouped: HashMap<usize, Vec<&String>> = HashMap::new();
    for line in lines {
        grouped.entry(line.chars().count()).or_default().push(line);
    }
    grouped
}

#[test]
fn test_scenario_a_fresh_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    let summary = run(config(&output, "ab", 2, 2));

    let mut written = lines(&output);
    written.sort();
    assert_eq!(written, vec!["aa", "ab", "ba", "bb"]);
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.snapshot.totals.written, 4);
    assert_eq!(summary.snapshot.totals.failed, 0);
    assert_eq!(summary.snapshot.totals.attempts, 4);
}

#[test]
fn test_scenario_b_second_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    run(config(&output, "ab", 2, 2));
    let second = run(config(&output, "ab", 2, 2));

    assert_eq!(second.snapshot.totals.written, 0);
    assert_eq!(second.snapshot.totals.failed, 4);
    assert_eq!(second.snapshot.totals.attempts, 4);
    assert_eq!(lines(&output).len(), 4);

    let len2 = &second.snapshot.per_length[&2];
    assert_eq!(len2.existing, 4);
    assert!(len2.is_complete());
}

#[test]
fn test_scenario_c_single_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    let summary = run(config(&output, "x", 1, 3));

    let mut written = lines(&output);
    written.sort();
    assert_eq!(written, vec!["x", "xx", "xxx"]);
    for length in 1..=3 {
        assert_eq!(summary.snapshot.per_length[&length].possible, BigUint::from(1u32));
    }
}

#[test]
fn test_completeness_and_no_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    let summary = run(config(&output, "abc", 1, 4));

    let all = lines(&output);
    let grouped = by_length(&all);
    for length in 1..=4usize {
        let entries = &grouped[&length];
        let unique: HashSet<_> = entries.iter().collect();
        assert_eq!(entries.len(), 3usize.pow(length as u32));
        assert_eq!(unique.len(), entries.len());
        assert_eq!(summary.snapshot.per_length[&length].existing, entries.len() as u64);
    }
}

#[test]
fn test_resume_fills_only_the_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");
    std::fs::write(&output, "bb\nab\nab\nzz\nb\n").unwrap();

    let summary = run(config(&output, "ab", 2, 2));

    // "ab" and "bb" were already there, "zz" is outside the charset but still length 2
    let len2 = &summary.snapshot.per_length[&2];
    assert_eq!(len2.written, 2);
    assert_eq!(len2.failed, 2);
    assert_eq!(len2.existing, 5);

    let all = lines(&output);
    assert_eq!(all.len(), 7);
    assert_eq!(&all[5..], &["aa".to_string(), "ba".to_string()]);
}

#[test]
fn test_idempotent_resume_matches_single_run() {
    let dir = tempfile::tempdir().unwrap();
    let once = dir.path().join("once.txt");
    let twice = dir.path().join("twice.txt");

    run(config(&once, "abc", 1, 3));
    run(config(&twice, "abc", 1, 3));
    let second = run(config(&twice, "abc", 1, 3));

    assert_eq!(second.snapshot.totals.written, 0);
    let mut a = lines(&once);
    let mut b = lines(&twice);
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_resume_with_space_and_unicode_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    run(config(&output, " é\u{a0}", 1, 2));
    let second = run(config(&output, " é\u{a0}", 1, 2));

    assert_eq!(second.snapshot.totals.written, 0);
    assert_eq!(second.snapshot.totals.failed, 3 + 9);
    assert_eq!(std::fs::read_to_string(&output).unwrap().lines().count(), 12);
}

#[test]
fn test_interrupted_run_resumes_to_full_set() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    let stop = StopSignal::new();
    let trigger = stop.clone();
    let mut cfg = config(&output, "abc", 2, 3);
    cfg.flush_every = 1;
    let first = Enumerator::new(cfg.clone(), Box::new(Recorder::default()), stop)
        .unwrap()
        .run(move |event| {
            if let combo_forge::ProgressEvent::Checkpoint { written: 12, .. } = event {
                trigger.trigger();
            }
        })
        .unwrap();
    assert_eq!(first.outcome, RunOutcome::Interrupted);
    assert_eq!(lines(&output).len(), 12);

    let second = run(cfg);
    assert_eq!(second.outcome, RunOutcome::Completed);
    assert_eq!(second.snapshot.totals.written, 9 + 27 - 12);

    let all = lines(&output);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(all.len(), 36);
    assert_eq!(unique.len(), 36);
}

#[test]
fn test_shuffle_produces_same_set() {
    let dir = tempfile::tempdir().unwrap();
    let ordered = dir.path().join("ordered.txt");
    let shuffled = dir.path().join("shuffled.txt");

    run(config(&ordered, "abcd", 1, 3));
    let mut cfg = config(&shuffled, "abcd", 1, 3);
    cfg.mode = EnumerationMode::Shuffled;
    let summary = run(cfg);

    let a: HashSet<String> = lines(&ordered).into_iter().collect();
    let b: HashSet<String> = lines(&shuffled).into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(summary.snapshot.totals.written, 4 + 16 + 64);
}

#[test]
fn test_conservation_at_every_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");
    std::fs::write(&output, "a\nbb\nccc\n").unwrap();

    let recorder = Recorder::default();
    Enumerator::new(config(&output, "abc", 1, 3), Box::new(recorder.clone()), StopSignal::new())
        .unwrap()
        .run(|_| {})
        .unwrap();

    let snapshots = recorder.0.lock();
    assert!(snapshots.len() > 3);
    for snapshot in snapshots.iter() {
        let totals = snapshot.totals;
        assert_eq!(totals.attempts, totals.written + totals.failed);
        for stats in snapshot.per_length.values() {
            assert!(stats.attempts() <= u64::try_from(&stats.possible).unwrap());
        }
    }
    let last = snapshots.last().unwrap();
    assert_eq!(last.totals.failed, 3);
    assert_eq!(last.totals.written, 3 + 9 + 27 - 3);
}

#[test]
fn test_file_report_written_next_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");
    let cfg = GenerationConfig {
        report_format: ReportFormat::Txt,
        ..config(&output, "ab", 1, 2)
    };
    let report_path = cfg.report_path();
    assert_eq!(report_path, dir.path().join("codes.txt.report.txt"));

    let reporter = FileReporter::new(&report_path, cfg.report_format);
    Enumerator::new(cfg, Box::new(reporter), StopSignal::new())
        .unwrap()
        .run(|_| {})
        .unwrap();

    let body = std::fs::read_to_string(&report_path).unwrap();
    assert!(body.contains("Total Success    : 6"));
    assert!(body.contains("100.00%"));
}

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("combo-forge").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_scenario_d_invalid_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("codes.txt");

    bin()
        .current_dir(dir.path())
        .args(["--output", output.to_str().unwrap(), "--min", "5", "--max", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("must not exceed"));

    assert!(!output.exists());
    let leftovers: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_cli_rejects_duplicate_charset() {
    let dir = tempfile::tempdir().unwrap();

    bin()
        .current_dir(dir.path())
        .args(["--charset", "aba", "--max", "2", "--no-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate symbol"));

    assert!(!dir.path().join("codes.txt").exists());
}

#[test]
fn test_cli_rejects_line_break_in_charset() {
    let dir = tempfile::tempdir().unwrap();

    for symbols in ["a\n", "a\r"] {
        bin()
            .current_dir(dir.path())
            .args(["--charset", symbols, "--min", "2", "--max", "2", "--no-progress"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("control character"));
    }

    bin()
        .current_dir(dir.path())
        .env("COMBO_FORGE_CHARSET", "x\r\n")
        .args(["--max", "2", "--no-progress"])
        .assert()
        .failure()
        .code(1);

    assert!(!dir.path().join("codes.txt").exists());
}

#[test]
fn test_cli_full_run_with_custom_charset() {
    let dir = tempfile::tempdir().unwrap();

    bin()
        .current_dir(dir.path())
        .args([
            "--charset",
            "ab",
            "--min",
            "1",
            "--max",
            "2",
            "--flush-every",
            "2",
            "--report-format",
            "json",
            "--no-progress",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("All lengths in range completed"))
        .stdout(predicate::str::contains("success: 6 | failed: 0 | attempts: 6"));

    let output = dir.path().join("codes.txt");
    assert_eq!(lines(&output).len(), 6);

    let report = std::fs::read_to_string(dir.path().join("codes.txt.report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["totals"]["written"], 6);
    assert_eq!(value["per_length"]["2"]["possible"], "4");
}

#[test]
fn test_cli_second_run_counts_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let args = ["--charset", "ab", "--min", "2", "--max", "2", "--report-format", "txt", "--no-progress"];

    bin().current_dir(dir.path()).args(args).assert().success();
    bin()
        .current_dir(dir.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("success: 0 | failed: 4 | attempts: 4"));

    assert_eq!(lines(&dir.path().join("codes.txt")).len(), 4);
    assert!(dir.path().join("codes.txt.report.txt").exists());
}
