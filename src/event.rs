use serde::{Deserialize, Serialize};

/// The two event kinds forming a matchable pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Opened,
    Closed,
}

/// How a tool window was opened. Carried only by `Opened` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginTag {
    Manual,
    Auto,
}

impl OriginTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OriginTag::Manual => "manual",
            OriginTag::Auto => "auto",
        }
    }
}

/// One row of the input log after parsing.
///
/// Timestamps are integer milliseconds, monotonic within a user but not
/// globally. `origin` is `None` on closed rows and on opened rows whose
/// `open_type` column was blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    pub timestamp_ms: i64,
    pub kind: EventKind,
    pub user_id: String,
    pub origin: Option<OriginTag>,
}

/// A successfully paired opened/closed span. Immutable once emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInterval {
    pub origin: Option<OriginTag>,
    pub duration_seconds: f64,
    pub user_id: String,
}
