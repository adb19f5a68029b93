use crate::event::{Event, OriginTag, SessionInterval};
use crate::stats::describe::GroupSummary;
use crate::stats::mannwhitney::{MannWhitneyError, MannWhitneyResult};
use crate::sweep::ThresholdRunResult;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const STAGE_INITIAL: &str = "initial_dataframe";
pub const STAGE_DEDUPED: &str = "delete_duplicates";
pub const STAGE_FINAL: &str = "final_dataframe";

/// Record counts with a per-origin breakdown at one pipeline checkpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StageStats {
    pub stage_name: String,
    pub total_records: u64,
    pub manual_count: u64,
    pub auto_count: u64,
}

impl StageStats {
    pub fn from_events(stage_name: &str, events: &[Event]) -> Self {
        let mut stats = Self::empty(stage_name, events.len() as u64);
        for event in events {
            stats.tally(event.origin);
        }
        stats
    }

    pub fn from_intervals(stage_name: &str, intervals: &[SessionInterval]) -> Self {
        let mut stats = Self::empty(stage_name, intervals.len() as u64);
        for interval in intervals {
            stats.tally(interval.origin);
        }
        stats
    }

    fn empty(stage_name: &str, total_records: u64) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            total_records,
            manual_count: 0,
            auto_count: 0,
        }
    }

    fn tally(&mut self, origin: Option<OriginTag>) {
        match origin {
            Some(OriginTag::Manual) => self.manual_count += 1,
            Some(OriginTag::Auto) => self.auto_count += 1,
            None => {}
        }
    }
}

#[derive(Debug, Serialize)]
struct SweepRow {
    time_window: u32,
    discarded_opens: u64,
    discarded_closes: u64,
    discarded_opens_percentage: Option<f64>,
    discarded_closes_percentage: Option<f64>,
    matched_pairs: u64,
    matched_pairs_percentage: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ensure_out_dir(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))
}

/// Writes `datasets_stats.csv`, one row per pipeline checkpoint.
pub fn write_stage_report(out_dir: &Path, stages: &[StageStats]) -> Result<PathBuf> {
    ensure_out_dir(out_dir)?;
    let path = out_dir.join("datasets_stats.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for stage in stages {
        writer.serialize(stage)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = stages.len(), "wrote stage report");
    Ok(path)
}

/// Writes `time_window_analysis.csv`, one row per configured window, with
/// percentages rounded to 2 decimals and blank when undefined.
pub fn write_sweep_report(out_dir: &Path, results: &[ThresholdRunResult]) -> Result<PathBuf> {
    ensure_out_dir(out_dir)?;
    let path = out_dir.join("time_window_analysis.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for result in results {
        writer.serialize(SweepRow {
            time_window: result.window_hours,
            discarded_opens: result.discarded_opens,
            discarded_closes: result.discarded_closes,
            discarded_opens_percentage: result.discarded_opens_pct.map(round2),
            discarded_closes_percentage: result.discarded_closes_pct.map(round2),
            matched_pairs: result.matched_pairs,
            matched_pairs_percentage: result.matched_pairs_pct.map(round2),
        })?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = results.len(), "wrote sweep report");
    Ok(path)
}

fn push_summary_row(out: &mut String, label: &str, summary: Option<&GroupSummary>) {
    match summary {
        Some(s) => {
            let _ = writeln!(
                out,
                "{label:<10}{:>10}{:>14.4}{:>14.4}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}",
                s.count, s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.p90, s.p99, s.max
            );
        }
        None => {
            let _ = writeln!(out, "{label:<10}{:>10}  (no matched sessions)", 0);
        }
    }
}

/// Writes `duration_analysis.txt`: per-origin summary table plus the
/// Mann-Whitney U result. A degenerate test input is reported instead of a
/// statistic so the rest of the report still lands.
pub fn write_duration_report(
    out_dir: &Path,
    manual: Option<&GroupSummary>,
    auto: Option<&GroupSummary>,
    test: &Result<MannWhitneyResult, MannWhitneyError>,
) -> Result<PathBuf> {
    ensure_out_dir(out_dir)?;
    let path = out_dir.join("duration_analysis.txt");

    let mut out = String::new();
    out.push_str("Summary Statistics by open_type\n\n");
    let _ = writeln!(
        out,
        "{:<10}{:>10}{:>14}{:>14}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}",
        "open_type", "count", "mean", "std", "min", "25%", "50%", "75%", "90%", "99%", "max"
    );
    push_summary_row(&mut out, "auto", auto);
    push_summary_row(&mut out, "manual", manual);
    out.push_str("\n=== Mann-Whitney U Test ===\n");
    match test {
        Ok(result) => {
            let _ = writeln!(out, "U statistic: {:.2}", result.u_statistic);
            let _ = writeln!(out, "P-value: {:.4e}", result.p_value);
            let _ = writeln!(out, "Effect size: {:.3}", result.effect_size);
        }
        Err(err) => {
            let _ = writeln!(out, "not computed: {err}");
        }
    }

    std::fs::write(&path, &out)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote duration report");
    Ok(path)
}
