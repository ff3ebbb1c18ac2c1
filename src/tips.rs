use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// One row of the prediction log. Column names match the sheet export; the
/// short aliases are accepted for hand-written JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TipRecord {
    /// 1 when the tip was right, 0 when it was wrong.
    #[serde(rename = "Outcome Score (1/0)", alias = "outcome")]
    pub outcome: u8,
    #[serde(rename = "Confidence %", alias = "confidence", default)]
    pub confidence: Option<f64>,
    /// Profit or loss on a simulated $100 stake.
    #[serde(rename = "ROI per tip", alias = "roi", default)]
    pub roi: Option<f64>,
}

impl TipRecord {
    pub fn is_correct(&self) -> bool {
        self.outcome == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TipSummary {
    pub correct: usize,
    pub total: usize,
    /// Mean confidence over correct tips that carry one.
    pub avg_confidence_correct: Option<f64>,
    /// Sum of per-tip ROI; blank cells count as nothing.
    pub roi_total: f64,
}

impl TipSummary {
    pub fn incorrect(&self) -> usize {
        self.total - self.correct
    }

    pub fn accuracy_pct(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.correct as f64 / self.total as f64 * 100.0)
    }
}

pub fn summarize(tips: &[TipRecord]) -> TipSummary {
    let correct: Vec<&TipRecord> = tips.iter().filter(|t| t.is_correct()).collect();
    let confidences: Vec<f64> = correct.iter().filter_map(|t| t.confidence).collect();
    let avg_confidence_correct = if confidences.is_empty() {
        None
    } else {
        Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
    };

    TipSummary {
        correct: correct.len(),
        total: tips.len(),
        avg_confidence_correct,
        roi_total: tips.iter().filter_map(|t| t.roi).sum(),
    }
}

pub fn parse_tips_json(raw: &str) -> Result<Vec<TipRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let tips: Vec<TipRecord> = serde_json::from_str(trimmed).context("invalid tips json")?;
    check_outcomes(&tips)?;
    Ok(tips)
}

pub fn parse_tips_csv(input: impl Read) -> Result<Vec<TipRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut tips = Vec::new();
    for (idx, record) in reader.deserialize::<TipRecord>().enumerate() {
        // Row 1 is the header.
        tips.push(record.with_context(|| format!("tips csv row {}", idx + 2))?);
    }
    check_outcomes(&tips)?;
    Ok(tips)
}

/// Reads a prediction log, picking CSV or JSON by file extension.
pub fn load_tips(path: &Path) -> Result<Vec<TipRecord>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        let file = fs::File::open(path)
            .with_context(|| format!("open tips from {}", path.display()))?;
        return parse_tips_csv(file).with_context(|| format!("parse {}", path.display()));
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read tips from {}", path.display()))?;
    parse_tips_json(&raw).with_context(|| format!("parse {}", path.display()))
}

fn check_outcomes(tips: &[TipRecord]) -> Result<()> {
    if let Some((idx, tip)) = tips.iter().enumerate().find(|(_, t)| t.outcome > 1) {
        bail!("tip {} has outcome {}, expected 0 or 1", idx + 1, tip.outcome);
    }
    Ok(())
}

/// `$12.50` / `-$7.25`.
pub fn fmt_dollars(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

/// Dashboard lines: the four headline numbers, then the correct/incorrect split.
pub fn summary_lines(summary: &TipSummary) -> Vec<String> {
    let confidence = summary
        .avg_confidence_correct
        .map(|c| format!("{c:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    let split = match summary.accuracy_pct() {
        Some(pct) => format!(
            "Correct {} / Incorrect {} ({pct:.1}%)",
            summary.correct,
            summary.incorrect()
        ),
        None => "No tips logged".to_string(),
    };
    vec![
        format!("Correct tips: {}", summary.correct),
        format!("Total tips: {}", summary.total),
        format!("Avg confidence (correct): {confidence}"),
        format!("Simulated ROI ($100): {}", fmt_dollars(summary.roi_total)),
        split,
    ]
}
