use crate::event::{Event, EventKind, SessionInterval};
use crate::ingest::EventLog;

/// Matches one user's time-ordered events into sessions under a recency
/// threshold (seconds).
///
/// Pending opens live in an ordered queue, oldest first. Each closed event
/// scans from the head and matches the first entry whose elapsed time is
/// strictly below the threshold; every older entry it skipped is discarded
/// with it. A closed event that matches nothing invalidates the entire queue.
///
/// The emitted interval takes its duration from the entry that satisfied the
/// threshold but its origin and user from the queue head, even when those are
/// different entries. Downstream origin-tag comparisons depend on this exact
/// attribution rule, so it must not be "fixed" here.
pub fn match_sessions(events: &[Event], threshold_seconds: f64) -> Vec<SessionInterval> {
    let mut pending: Vec<&Event> = Vec::new();
    let mut sessions: Vec<SessionInterval> = Vec::new();

    for event in events {
        match event.kind {
            EventKind::Opened => pending.push(event),
            EventKind::Closed => {
                let mut matched: Option<(usize, f64)> = None;
                for (idx, open) in pending.iter().enumerate() {
                    let elapsed = (event.timestamp_ms - open.timestamp_ms) as f64 / 1000.0;
                    if elapsed < threshold_seconds {
                        matched = Some((idx, elapsed));
                        break;
                    }
                }
                match matched {
                    Some((idx, elapsed)) => {
                        let head = pending[0];
                        sessions.push(SessionInterval {
                            origin: head.origin,
                            duration_seconds: elapsed,
                            user_id: head.user_id.clone(),
                        });
                        pending.drain(0..=idx);
                    }
                    None => pending.clear(),
                }
            }
        }
    }

    // Opens still pending at end of stream are discarded unmatched.
    sessions
}

/// Runs the matcher independently over every user partition and concatenates
/// the results. Both the single-threshold pipeline and the window sweep go
/// through here so the two paths cannot drift.
pub fn match_log(log: &EventLog, threshold_seconds: f64) -> Vec<SessionInterval> {
    let mut sessions: Vec<SessionInterval> = Vec::new();
    for (_user_id, events) in log.partitions() {
        sessions.extend(match_sessions(events, threshold_seconds));
    }
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::OriginTag;

    fn opened(ts: i64, origin: Option<OriginTag>) -> Event {
        Event {
            timestamp_ms: ts,
            kind: EventKind::Opened,
            user_id: "u1".to_string(),
            origin,
        }
    }

    fn closed(ts: i64) -> Event {
        Event {
            timestamp_ms: ts,
            kind: EventKind::Closed,
            user_id: "u1".to_string(),
            origin: None,
        }
    }

    #[test]
    fn single_pair_matches_with_expected_duration() {
        let events = vec![opened(1000, Some(OriginTag::Manual)), closed(5000)];
        let sessions = match_sessions(&events, 10.0);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].origin, Some(OriginTag::Manual));
        assert!((sessions[0].duration_seconds - 4.0).abs() < 1e-12);
        assert_eq!(sessions[0].user_id, "u1");
    }

    #[test]
    fn stale_close_matches_nothing_and_clears_the_queue() {
        let events = vec![
            opened(0, Some(OriginTag::Manual)),
            closed(100_000_000),
            // A pair after the clear must still match.
            opened(100_001_000, Some(OriginTag::Auto)),
            closed(100_002_000),
        ];
        let sessions = match_sessions(&events, 10.0);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].origin, Some(OriginTag::Auto));
        assert!((sessions[0].duration_seconds - 1.0).abs() < 1e-12);
    }

    #[test]
    fn duration_comes_from_match_but_origin_from_queue_head() {
        // Head fails the window (21s >= 5s), second entry passes (1s < 5s).
        let events = vec![
            opened(0, Some(OriginTag::Manual)),
            opened(20_000, Some(OriginTag::Auto)),
            closed(21_000),
        ];
        let sessions = match_sessions(&events, 5.0);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].origin, Some(OriginTag::Manual));
        assert!((sessions[0].duration_seconds - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matching_drains_the_skipped_entries_too() {
        let events = vec![
            opened(0, Some(OriginTag::Manual)),
            opened(20_000, Some(OriginTag::Auto)),
            closed(21_000),
            // The queue is now empty, so this close clears nothing and the
            // trailing open is discarded at end of stream.
            closed(22_000),
            opened(23_000, Some(OriginTag::Manual)),
        ];
        let sessions = match_sessions(&events, 5.0);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn elapsed_equal_to_threshold_does_not_match() {
        let events = vec![opened(0, Some(OriginTag::Manual)), closed(5_000)];
        assert!(match_sessions(&events, 5.0).is_empty());
        assert_eq!(match_sessions(&events, 5.001).len(), 1);
    }

    #[test]
    fn unmatched_close_clears_all_pending_opens() {
        let events = vec![
            opened(0, Some(OriginTag::Manual)),
            opened(1_000, Some(OriginTag::Auto)),
            closed(200_000),
            closed(201_000),
        ];
        let sessions = match_sessions(&events, 10.0);
        assert!(sessions.is_empty());
    }

    #[test]
    fn empty_input_produces_empty_output() {
        assert!(match_sessions(&[], 10.0).is_empty());
    }

    #[test]
    fn durations_stay_below_threshold_and_non_negative() {
        let events = vec![
            opened(0, Some(OriginTag::Manual)),
            closed(500),
            opened(1_000, Some(OriginTag::Auto)),
            opened(2_000, None),
            closed(9_000),
            opened(10_000, Some(OriginTag::Manual)),
            closed(400_000),
        ];
        let threshold = 10.0;
        for session in match_sessions(&events, threshold) {
            assert!(session.duration_seconds >= 0.0);
            assert!(session.duration_seconds < threshold);
        }
    }

    #[test]
    fn matcher_is_deterministic_across_runs() {
        let events = vec![
            opened(0, Some(OriginTag::Manual)),
            opened(5_000, Some(OriginTag::Auto)),
            closed(8_000),
            closed(9_000),
            opened(12_000, None),
            closed(13_000),
        ];
        let first = match_sessions(&events, 6.0);
        let second = match_sessions(&events, 6.0);
        assert_eq!(first, second);
    }
}
