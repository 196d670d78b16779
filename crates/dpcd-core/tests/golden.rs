use std::fs;
use std::path::{Path, PathBuf};

use dpcd_core::{DecodeOptions, Direction, TransactionReport, decode_trace_file};

fn golden_dir(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(dir)
}

fn load_expected(dir: &str) -> Vec<TransactionReport> {
    let expected_path = golden_dir(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let input = golden_dir(dir).join("input.log");
    let expected = load_expected(dir);

    let actual = decode_trace_file(&input, &DecodeOptions::default()).expect("decode trace");

    let actual_value = serde_json::to_value(&actual).expect("serialize actual");
    let expected_value = serde_json::to_value(&expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_aux_trace() {
    run_golden("tests/golden/aux_trace");
}

#[test]
fn golden_aux_trace_skips_noise_and_failed_reads() {
    let reports = load_expected("tests/golden/aux_trace");
    let lines: Vec<_> = reports.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![2, 4, 5]);
    assert_eq!(reports[1].direction, Direction::Write);
    assert!(reports.iter().all(|r| r.error.is_none()));
}

#[test]
fn golden_aux_trace_has_sideband_reply() {
    let reports = load_expected("tests/golden/aux_trace");
    let report = reports[2].report.as_ref().expect("sideband report");
    let record = &report.records[0];
    assert_eq!(record.name, "QUERY_PAYLOAD");
    assert_eq!(record.raw_bytes.len(), 9);
    assert_eq!(record.field("Allocated PBN").map(|f| f.raw_value), Some(300));
    assert_eq!(record.fields.last().map(|f| f.label.as_str()), Some("Body CRC"));
    assert!(report.unparsed.is_empty());
}
