use crate::cli::{AnalyzeArgs, SweepArgs};
use crate::ingest::{self, EventLog, RawLog};
use crate::matcher;
use crate::report::{self, StageStats, STAGE_DEDUPED, STAGE_FINAL, STAGE_INITIAL};
use crate::stats::describe::summarize;
use crate::stats::mannwhitney::mann_whitney_u;
use crate::event::Event;
use crate::stats::durations_by_origin;
use crate::sweep;
use anyhow::{Context, Result};
use std::path::Path;

fn load_raw(input: &Path) -> Result<RawLog> {
    let raw = ingest::read_events_from_path(input)
        .with_context(|| format!("failed to ingest {}", input.display()))?;
    tracing::info!(
        phase = "ingest",
        rows = raw.events.len(),
        malformed_rows = raw.malformed_rows,
        "event log loaded"
    );
    Ok(raw)
}

fn dedupe_and_log(events: Vec<Event>) -> Vec<Event> {
    let before = events.len();
    let deduped = ingest::dedupe_events(events);
    tracing::info!(
        phase = "dedupe",
        rows = deduped.len(),
        duplicates = before - deduped.len(),
        "exact-row duplicates removed"
    );
    deduped
}

/// Single-threshold pipeline: ingest, dedupe, match, then write the stage
/// report and the duration statistics report.
pub fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let raw = load_raw(&args.input)?;
    let mut stages = vec![StageStats::from_events(STAGE_INITIAL, &raw.events)];

    let deduped = dedupe_and_log(raw.events);
    stages.push(StageStats::from_events(STAGE_DEDUPED, &deduped));

    let log = EventLog::build(deduped);
    let threshold_seconds = f64::from(args.max_duration_hours) * 3600.0;
    let intervals = matcher::match_log(&log, threshold_seconds);
    tracing::info!(
        phase = "match",
        users = log.user_count(),
        matched_pairs = intervals.len(),
        threshold_seconds,
        "session matching complete"
    );
    stages.push(StageStats::from_intervals(STAGE_FINAL, &intervals));

    report::write_stage_report(&args.out_dir, &stages)?;

    let (manual, auto) = durations_by_origin(&intervals);
    let test = mann_whitney_u(&manual, &auto);
    if let Err(err) = &test {
        tracing::warn!(error = %err, "duration hypothesis test not computed");
    }
    report::write_duration_report(
        &args.out_dir,
        summarize(&manual).as_ref(),
        summarize(&auto).as_ref(),
        &test,
    )?;
    Ok(())
}

/// Threshold sweep: ingest, dedupe, then one matcher pass per window.
pub fn sweep(args: &SweepArgs) -> Result<()> {
    let raw = load_raw(&args.input)?;
    let deduped = dedupe_and_log(raw.events);
    let log = EventLog::build(deduped);

    let results = sweep::run_sweep(&log, &args.windows);
    report::write_sweep_report(&args.out_dir, &results)?;
    Ok(())
}
