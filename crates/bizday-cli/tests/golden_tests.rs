use std::fs;
use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use similar::{ChangeTag, TextDiff};

/// Fixture stem, timezone, close time, input format.
const BOUNDS_CASES: &[(&str, &str, &str, &str)] = &[
    ("new_york_two_am", "America/New_York", "02:00", "rfc3339"),
    ("berlin_midnight", "Europe/Berlin", "00:00", "epoch_ms"),
];

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    project_root().join("fixtures")
}

fn golden_dir() -> PathBuf {
    project_root().join("golden")
}

fn update_golden() -> bool {
    std::env::var("UPDATE_GOLDEN").is_ok()
}

fn diff_strings(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(&format!("{sign}{change}"));
    }
    out
}

fn bizday(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bizday"))
        .args(args)
        .env_remove("BIZDAY_CACHE_TTL_SECS")
        .env_remove("BIZDAY_SWEEP_THRESHOLD")
        .output()
        .expect("Failed to execute bizday")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "bizday failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output is not valid JSON")
}

#[test]
fn golden_bounds_output() {
    let golden = golden_dir();

    for &(stem, tz, close, format) in BOUNDS_CASES {
        let fixture_path = fixture_dir().join(format!("{stem}.txt"));
        let golden_path = golden.join(format!("{stem}.jsonl"));

        let output = bizday(&[
            "bounds",
            "--tz",
            tz,
            "--close-time",
            close,
            "--format",
            format,
            "--output-format",
            "json",
            "--input",
            fixture_path.to_str().unwrap(),
        ]);

        assert!(
            output.status.success(),
            "bizday failed for {}: {}",
            stem,
            String::from_utf8_lossy(&output.stderr)
        );

        let actual = String::from_utf8(output.stdout).expect("Output is not valid UTF-8");

        if update_golden() {
            fs::create_dir_all(&golden).ok();
            fs::write(&golden_path, &actual)
                .unwrap_or_else(|e| panic!("Failed to write golden file {golden_path:?}: {e}"));
            eprintln!("Updated golden file: {golden_path:?}");
            continue;
        }

        let expected = fs::read_to_string(&golden_path).unwrap_or_else(|e| {
            panic!(
                "Golden file {golden_path:?} not found: {e}\n\
                 Hint: Run with UPDATE_GOLDEN=1 to generate golden files"
            )
        });

        if actual != expected {
            let diff = diff_strings(&expected, &actual);
            panic!(
                "Golden test mismatch for {stem}:\n\n\
                 {diff}\n\n\
                 Run with UPDATE_GOLDEN=1 to refresh snapshots"
            );
        }
    }
}

#[test]
fn range_lists_contiguous_days() {
    let output = bizday(&[
        "range",
        "--tz",
        "America/New_York",
        "--close-time",
        "02:00",
        "--start",
        "2024-11-02",
        "--end",
        "2024-11-03",
    ]);
    let days = stdout_json(&output);
    let days = days.as_array().unwrap();

    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["operating_day"], "2024-11-02");
    assert_eq!(days[0]["start_utc"], "2024-11-02T06:00:00.000Z");
    // Fall back: the first day lasts 25 hours.
    assert_eq!(days[0]["end_utc"], "2024-11-03T06:59:59.999Z");
    assert_eq!(days[1]["start_utc"], "2024-11-03T07:00:00.000Z");
    assert_eq!(days[1]["start_local"], "2024-11-03T02:00:00.000-05:00");
}

#[test]
fn collapse_uses_business_day_when_configured() {
    let output = bizday(&[
        "collapse",
        "--tz",
        "America/New_York",
        "--close-time",
        "02:00",
        "--start",
        "2024-06-17",
        "--end",
        "2024-06-18",
    ]);
    let result = stdout_json(&output);

    assert_eq!(result["start_utc"], "2024-06-17T06:00:00.000Z");
    assert_eq!(result["end_utc"], "2024-06-19T05:59:59.999Z");
    assert_eq!(result["source"], "business_day");
}

#[test]
fn collapse_falls_back_when_close_time_absent() {
    let output = bizday(&[
        "collapse",
        "--tz",
        "America/New_York",
        "--start",
        "2024-06-17",
        "--end",
        "2024-06-17",
    ]);
    let result = stdout_json(&output);

    assert_eq!(result["start_utc"], "2024-06-17T04:00:00.000Z");
    assert_eq!(result["end_utc"], "2024-06-18T03:59:59.999Z");
    assert_eq!(result["source"], "calendar_midnight");
    assert_eq!(result["fallback"], "absent");
}

#[test]
fn collapse_strict_reports_missing_setting() {
    let output = bizday(&[
        "collapse",
        "--tz",
        "America/New_York",
        "--start",
        "2024-06-17",
        "--end",
        "2024-06-17",
        "--fallback",
        "strict",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["exit_code"], 2);
    assert_eq!(envelope["kind"], "missing_config");
    assert_eq!(
        envelope["error"],
        "Missing configuration: businessCloseTime"
    );
}

#[test]
fn malformed_close_time_is_input_error() {
    let output = bizday(&[
        "range",
        "--tz",
        "UTC",
        "--close-time",
        "25:00",
        "--start",
        "2024-06-17",
        "--end",
        "2024-06-17",
        "--output-format",
        "text",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid close time"), "stderr: {stderr}");
}

#[test]
fn unknown_timezone_is_input_error() {
    let output = bizday(&["today", "--tz", "Not/AZone", "--close-time", "02:00"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn find_reports_membership() {
    let fixture_path = fixture_dir().join("new_york_two_am.txt");
    let output = bizday(&[
        "find",
        "--tz",
        "America/New_York",
        "--close-time",
        "02:00",
        "--format",
        "rfc3339",
        "--day",
        "2024-06-17",
        "--output-format",
        "json",
        "--input",
        fixture_path.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let lines: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["operating_day"], "2024-06-17");
    assert_eq!(lines[0]["in_day"], true);
    assert_eq!(lines[1]["operating_day"], "2024-06-18");
    assert_eq!(lines[1]["in_day"], false);
    assert_eq!(lines[2]["operating_day"], "2024-03-10");
}

#[test]
fn today_prints_a_day_containing_now() {
    let output = bizday(&[
        "today",
        "--tz",
        "Australia/Sydney",
        "--close-time",
        "03:30",
        "--output-format",
        "json",
    ]);
    let report = stdout_json(&output);

    let start = chrono::DateTime::parse_from_rfc3339(report["start_utc"].as_str().unwrap()).unwrap();
    let end = chrono::DateTime::parse_from_rfc3339(report["end_utc"].as_str().unwrap()).unwrap();
    assert!(start < end);
}

#[test]
fn collapse_echoes_fallback_as_typed() {
    let output = bizday(&[
        "collapse",
        "--start",
        "2024-06-17",
        "--end",
        "2024-06-17",
        "--fallback",
        "error",
    ]);
    let result = stdout_json(&output);

    assert_eq!(result["fallback"], "error");
    assert_eq!(result["start_utc"], "2024-06-17T00:00:00.000Z");
}

#[test]
fn extreme_epoch_is_runtime_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_bizday"))
        .args([
            "bounds",
            "--tz",
            "Asia/Tokyo",
            "--close-time",
            "02:00",
            "--format",
            "epoch_ms",
            "--output-format",
            "json",
            "--input",
            "-",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            // +262142-12-31T20:00Z, past chrono's last date once shifted to Tokyo.
            child
                .stdin
                .take()
                .expect("stdin is piped")
                .write_all(b"8210266862400000\n")?;
            child.wait_with_output()
        })
        .expect("Failed to execute bizday");

    assert_eq!(
        output.status.code(),
        Some(3),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let envelope: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["kind"], "out_of_range");
}

#[test]
fn jumped_date_is_left_out_of_range() {
    let output = bizday(&[
        "range",
        "--tz",
        "Pacific/Apia",
        "--close-time",
        "02:00",
        "--start",
        "2011-12-29",
        "--end",
        "2011-12-31",
    ]);
    let days = stdout_json(&output);
    let days = days.as_array().unwrap();

    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["operating_day"], "2011-12-29");
    assert_eq!(days[0]["end_utc"], "2011-12-30T11:59:59.999Z");
    assert_eq!(days[1]["operating_day"], "2011-12-31");
    assert_eq!(days[1]["start_utc"], "2011-12-30T12:00:00.000Z");
}
