//! Reward ledger: append-only history of completed sessions.
//!
//! Every completed countdown appends exactly one [`SessionRecord`] carrying
//! the points it earned. Records are never mutated or deleted; statistics
//! and the garden are derived from this history. The full list is rewritten
//! to the store on each append, which at a few records per hour is cheap and
//! keeps the persisted shape a single JSON document.
//!
//! ## At-most-once recording
//!
//! Completion events carry the engine's monotone sequence number. The ledger
//! remembers the highest sequence it has recorded and silently drops replays,
//! so a completion processed twice (a re-entrant tick, an event delivered to
//! a rehydrated process) can never double-count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;
use crate::storage::{keys, Store};
use crate::timer::SessionType;

/// One completed session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Seconds elapsed, equal to the configured duration at completion time.
    pub duration: u32,
    pub completed_at: DateTime<Utc>,
    pub points_earned: u32,
}

/// Append-only session history with a replay guard.
#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    records: Vec<SessionRecord>,
    /// Highest completion sequence already recorded.
    last_recorded_seq: u64,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full history, oldest first.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Treats every completion up to `sequence` as already recorded.
    ///
    /// Called after hydration with the persisted engine's sequence so that a
    /// replayed completion event from before this process started cannot
    /// append a duplicate record.
    pub fn mark_recorded_through(&mut self, sequence: u64) {
        self.last_recorded_seq = self.last_recorded_seq.max(sequence);
    }

    /// Appends a record for a completed session.
    ///
    /// Points are fixed by the completed type (25 for work, 10 for breaks).
    /// Returns `None` without touching the history when `sequence` has
    /// already been recorded.
    pub fn record_completion(
        &mut self,
        sequence: u64,
        session_type: SessionType,
        duration_secs: u32,
        completed_at: DateTime<Utc>,
    ) -> Option<&SessionRecord> {
        if sequence <= self.last_recorded_seq {
            warn!(
                "dropping replayed completion (sequence {sequence}, recorded through {})",
                self.last_recorded_seq
            );
            return None;
        }
        self.last_recorded_seq = sequence;
        self.records.push(SessionRecord {
            session_type,
            duration: duration_secs,
            completed_at,
            points_earned: session_type.points(),
        });
        self.records.last()
    }

    /// Hydrates the history from the store.
    ///
    /// A missing key yields an empty ledger. A corrupted value is logged and
    /// discarded rather than wedging startup; the next save overwrites it.
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        let records = store.get_or_default(keys::SESSIONS).await?;
        Ok(Self {
            records,
            last_recorded_seq: 0,
        })
    }

    /// Writes the whole history back to the store.
    pub async fn save(&self, store: &Store) -> Result<(), StoreError> {
        store.put(keys::SESSIONS, &self.records).await
    }
}
