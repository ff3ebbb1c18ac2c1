use std::path::PathBuf;

use nrl25_terminal::tips::{load_tips, summarize, summary_lines};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn csv_and_json_logs_agree() {
    let from_csv = load_tips(&fixture_path("tips.csv")).unwrap();
    let from_json = load_tips(&fixture_path("tips.json")).unwrap();
    assert_eq!(from_csv, from_json);

    let summary = summarize(&from_csv);
    assert_eq!(summary.correct, 3);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.incorrect(), 1);
    assert_eq!(
        summary_lines(&summary),
        vec![
            "Correct tips: 3",
            "Total tips: 4",
            "Avg confidence (correct): 76.5%",
            "Simulated ROI ($100): $13.50",
            "Correct 3 / Incorrect 1 (75.0%)",
        ]
    );
}

#[test]
fn missing_log_names_the_path() {
    let err = load_tips(&fixture_path("no_such_log.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("no_such_log.csv"));
}
