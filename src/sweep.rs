use crate::ingest::EventLog;
use crate::matcher;

/// Aggregate discard/match statistics for one threshold.
///
/// `total_opens` and `total_closes` are properties of the log, not of the
/// threshold; percentage fields are `None` when their denominator is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRunResult {
    pub window_hours: u32,
    pub threshold_seconds: f64,
    pub total_opens: u64,
    pub total_closes: u64,
    pub matched_pairs: u64,
    pub discarded_opens: u64,
    pub discarded_closes: u64,
    pub discarded_opens_pct: Option<f64>,
    pub discarded_closes_pct: Option<f64>,
    pub matched_pairs_pct: Option<f64>,
}

fn pct(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64 * 100.0)
}

/// Runs the matcher over the full log once per configured window and derives
/// discard statistics. Output order follows the configured window order, and
/// identical inputs produce identical results.
pub fn run_sweep(log: &EventLog, windows_hours: &[u32]) -> Vec<ThresholdRunResult> {
    let total_opens = log.total_opens();
    let total_closes = log.total_closes();
    let min_pairs = total_opens.min(total_closes);

    let mut results: Vec<ThresholdRunResult> = Vec::with_capacity(windows_hours.len());
    for &window_hours in windows_hours {
        let threshold_seconds = f64::from(window_hours) * 3600.0;
        let matched_pairs = matcher::match_log(log, threshold_seconds).len() as u64;
        let discarded_opens = total_opens - matched_pairs;
        let discarded_closes = total_closes - matched_pairs;

        tracing::info!(
            phase = "sweep_window",
            window_hours,
            matched_pairs,
            discarded_opens,
            discarded_closes,
            "window sweep step complete"
        );

        results.push(ThresholdRunResult {
            window_hours,
            threshold_seconds,
            total_opens,
            total_closes,
            matched_pairs,
            discarded_opens,
            discarded_closes,
            discarded_opens_pct: pct(discarded_opens, total_opens),
            discarded_closes_pct: pct(discarded_closes, total_closes),
            matched_pairs_pct: pct(matched_pairs, min_pairs),
        });
    }
    results
}
