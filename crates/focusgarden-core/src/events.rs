use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionType;

/// Every state change of the session engine produces an Event.
/// The CLI prints them; the driver forwards them to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_type: SessionType,
        current_session: u32,
        time_left_secs: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_type: SessionType,
        time_left_secs: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        session_type: SessionType,
        time_left_secs: u32,
        at: DateTime<Utc>,
    },
    /// Manual session-type override. An abandonment, not a completion:
    /// no record is written and no points are earned.
    SessionTypeChanged {
        session_type: SessionType,
        current_session: u32,
        time_left_secs: u32,
        at: DateTime<Utc>,
    },
    /// A countdown ran to zero. Carries everything the reward ledger
    /// needs; `sequence` makes duplicate delivery detectable.
    SessionCompleted {
        completed: SessionType,
        duration_secs: u32,
        points: u32,
        sequence: u64,
        next_type: SessionType,
        current_session: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session_type: SessionType,
        current_session: u32,
        running: bool,
        time_left_secs: u32,
        duration_secs: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}
