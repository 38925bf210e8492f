use serde::{Deserialize, Serialize};

/// Points credited for a completed work session.
pub const WORK_POINTS: u32 = 25;
/// Points credited for a completed break of either length.
pub const BREAK_POINTS: u32 = 10;

/// The three kinds of countdown a session can run.
///
/// Wire names match the persisted JSON of the mobile app
/// (`work` / `shortBreak` / `longBreak`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn is_work(self) -> bool {
        matches!(self, SessionType::Work)
    }

    /// Points earned when a session of this type completes.
    pub fn points(self) -> u32 {
        match self {
            SessionType::Work => WORK_POINTS,
            SessionType::ShortBreak | SessionType::LongBreak => BREAK_POINTS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionType::Work => "Work",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }
}

/// Configured duration, in seconds, for each session type.
///
/// A plan is a value snapshot: the engine copies one in and keeps using it
/// until the next session-type change, so edits to settings never retime a
/// countdown that is already underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub work_secs: u32,
    pub short_break_secs: u32,
    pub long_break_secs: u32,
}

impl SessionPlan {
    pub fn duration_secs(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Work => self.work_secs,
            SessionType::ShortBreak => self.short_break_secs,
            SessionType::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for SessionPlan {
    /// The classic 25/5/15-minute plan.
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
        }
    }
}
