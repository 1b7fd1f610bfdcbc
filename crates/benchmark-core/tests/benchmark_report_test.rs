//! End-to-end report rendering against the real clock and process memory

use benchmark_core::{Benchmark, BenchmarkError, CRLF, DisplayMode};
use serial_test::serial;

/// Split a value like `1.500Kb` or `512B` into its number and unit
fn split_measure(text: &str) -> (&str, &str) {
    let boundary = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    text.split_at(boundary)
}

fn assert_size(text: &str) {
    let (number, unit) = split_measure(text);
    assert!(number.parse::<f64>().is_ok(), "not a number: {text:?}");
    assert!(["B", "Kb", "Mb", "Gb", "Tb"].contains(&unit), "unknown unit: {text:?}");
    if unit == "B" {
        assert!(!number.contains('.'), "bytes must be integral: {text:?}");
    } else {
        assert_eq!(number.split('.').nth(1).map(str::len), Some(3), "{text:?}");
    }
}

fn field<'a>(line: &'a str, label: &str) -> &'a str {
    line.strip_prefix(label).unwrap_or_else(|| panic!("{line:?} does not start with {label:?}"))
}

#[test]
#[serial]
fn test_comment_report_round_trip() {
    let mut bench = Benchmark::new();
    bench.start();
    let report = bench.stop(false).unwrap();
    let lines: Vec<&str> = report.split(CRLF).collect();

    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "");
    assert_eq!(lines[1], "    <!-- ======== [ BENCHMARK DATA ] ======== ");
    assert_eq!(lines[2], "    Elapsed Time: 0ms");

    let raw = field(lines[3], "    Elapsed Time: ");
    let raw = raw.strip_suffix(" (micro)").unwrap();
    let seconds: f64 = raw.parse().unwrap();
    assert!((0.0..0.5).contains(&seconds));

    assert_size(field(lines[4], "    Memory Usage: "));

    let peak = field(lines[5], "     Peak Memory: ");
    let (humanized, raw_bytes) = peak.split_once(" (or ").unwrap();
    assert_size(humanized);
    let raw_bytes = raw_bytes.strip_suffix(" bytes)").unwrap();
    assert!(raw_bytes.parse::<u64>().is_ok());

    let date = field(lines[6], "            Date: ");
    assert!(chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").is_ok());

    assert_eq!(lines[7], "    ===================================== -->");
    assert_eq!(bench.display_mode(), DisplayMode::Comment);
}

#[test]
#[serial]
fn test_display_report_uses_pre_block() {
    let mut bench = Benchmark::new();
    let report = bench.start().stop(true).unwrap();
    let lines: Vec<&str> = report.split(CRLF).collect();

    assert_eq!(lines[0], "");
    assert_eq!(lines[1], "<pre id=\"bench\">");
    assert_eq!(lines[2], " ======== [ BENCHMARK DATA ] ======== ");
    assert_eq!(lines[3], "    Elapsed Time: 0ms");
    assert_eq!(lines[lines.len() - 2], "    ===================================== ");
    assert_eq!(lines[lines.len() - 1], "</pre>");
    assert!(!report.contains("<!--"));
    assert!(!report.contains("-->"));
}

#[test]
fn test_stop_without_start_fails() {
    let mut bench = Benchmark::new();
    match bench.stop(false) {
        Err(BenchmarkError::NotStarted { name }) => assert_eq!(name, None),
        other => panic!("expected NotStarted, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_report_memory_matches_timer_state() {
    let mut bench = Benchmark::new();
    bench.start();
    let report = bench.stop_report(false).unwrap();
    assert_eq!(report.memory_used, bench.memory_used());
    assert!(report.peak_memory >= report.memory_used);
    assert_eq!(Some(report.elapsed), bench.elapsed());
}
