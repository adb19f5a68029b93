use crate::event::{Event, EventKind, OriginTag};
use csv::StringRecord;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const COL_TIMESTAMP: &str = "timestamp";
const COL_EVENT: &str = "event";
const COL_USER_ID: &str = "user_id";
const COL_OPEN_TYPE: &str = "open_type";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Parsed rows before deduplication, in input order.
#[derive(Debug)]
pub struct RawLog {
    pub events: Vec<Event>,
    pub malformed_rows: u64,
}

/// The deduplicated log partitioned by user, each partition sorted by
/// timestamp ascending (ties keep input order).
#[derive(Debug)]
pub struct EventLog {
    by_user: BTreeMap<String, Vec<Event>>,
    total_opens: u64,
    total_closes: u64,
}

impl EventLog {
    /// Stable-sorts by `(user_id, timestamp)` and partitions into per-user
    /// slices. Expects already-deduplicated events.
    pub fn build(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then(a.timestamp_ms.cmp(&b.timestamp_ms))
        });

        let mut total_opens = 0u64;
        let mut total_closes = 0u64;
        let mut by_user: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        for event in events {
            match event.kind {
                EventKind::Opened => total_opens += 1,
                EventKind::Closed => total_closes += 1,
            }
            by_user.entry(event.user_id.clone()).or_default().push(event);
        }

        Self {
            by_user,
            total_opens,
            total_closes,
        }
    }

    pub fn partitions(&self) -> impl Iterator<Item = (&str, &[Event])> {
        self.by_user
            .iter()
            .map(|(user_id, events)| (user_id.as_str(), events.as_slice()))
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn event_count(&self) -> usize {
        self.by_user.values().map(Vec::len).sum()
    }

    pub fn total_opens(&self) -> u64 {
        self.total_opens
    }

    pub fn total_closes(&self) -> u64 {
        self.total_closes
    }
}

pub fn read_events_from_path(path: &Path) -> Result<RawLog, IngestError> {
    let file = std::fs::File::open(path)?;
    read_events(file)
}

/// Reads the tabular log. A missing required column fails the whole read;
/// individually malformed rows are logged, counted, and excluded so they can
/// never corrupt a pending queue.
pub fn read_events<R: Read>(reader: R) -> Result<RawLog, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(IngestError::MissingColumn(name))
    };
    let timestamp_idx = column(COL_TIMESTAMP)?;
    let event_idx = column(COL_EVENT)?;
    let user_idx = column(COL_USER_ID)?;
    let open_type_idx = column(COL_OPEN_TYPE)?;

    let mut events: Vec<Event> = Vec::new();
    let mut malformed_rows = 0u64;
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        match parse_record(&record, timestamp_idx, event_idx, user_idx, open_type_idx) {
            Ok(event) => events.push(event),
            Err(reason) => {
                malformed_rows += 1;
                // +2: one for the header row, one for zero-based enumeration.
                tracing::warn!(row = idx + 2, reason, "skipping malformed row");
            }
        }
    }

    Ok(RawLog {
        events,
        malformed_rows,
    })
}

fn parse_record(
    record: &StringRecord,
    timestamp_idx: usize,
    event_idx: usize,
    user_idx: usize,
    open_type_idx: usize,
) -> Result<Event, &'static str> {
    let timestamp_ms: i64 = record
        .get(timestamp_idx)
        .ok_or("missing timestamp field")?
        .parse()
        .map_err(|_| "timestamp is not an integer")?;

    let kind = match record.get(event_idx).ok_or("missing event field")? {
        "opened" => EventKind::Opened,
        "closed" => EventKind::Closed,
        _ => return Err("unknown event kind"),
    };

    let user_id = record.get(user_idx).ok_or("missing user_id field")?.to_string();

    // open_type is only meaningful on opened rows; whatever the closed rows
    // carry in that column is ignored.
    let origin = match kind {
        EventKind::Closed => None,
        EventKind::Opened => match record.get(open_type_idx).unwrap_or("") {
            "" => None,
            "manual" => Some(OriginTag::Manual),
            "auto" => Some(OriginTag::Auto),
            _ => return Err("unknown open_type"),
        },
    };

    Ok(Event {
        timestamp_ms,
        kind,
        user_id,
        origin,
    })
}

/// Removes exact-row duplicates, keeping the first occurrence in input order.
pub fn dedupe_events(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<Event> = HashSet::with_capacity(events.len());
    let mut out: Vec<Event> = Vec::with_capacity(events.len());
    for event in events {
        if seen.insert(event.clone()) {
            out.push(event);
        }
    }
    out
}
