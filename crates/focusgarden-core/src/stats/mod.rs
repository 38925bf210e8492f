//! Statistics derived from the session history.
//!
//! Everything here is a pure function of the full [`SessionRecord`] list and
//! a `now` timestamp. Nothing is persisted independently; the app recomputes
//! a [`StatsSnapshot`] on load and after every ledger append, so the numbers
//! can never drift from the history they summarize.
//!
//! Day and week boundaries use UTC. Weeks start on Sunday.

mod streak;

pub use streak::{current_streak, longest_streak};

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::SessionRecord;

/// Today's totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// Sessions of any type completed today.
    pub completed: u64,
    /// Seconds of completed work sessions today.
    pub focus_time: u64,
    /// Seconds of completed break sessions today.
    pub break_time: u64,
    /// Points earned today across all session types.
    pub points_earned: u64,
}

/// Completion count for one weekday of the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    /// Short weekday name ("Sun" through "Sat").
    pub day: String,
    /// Sessions of any type completed on that day.
    pub count: u64,
}

/// Per-day completion counts for the calendar week containing `now`.
///
/// Always seven entries, Sunday first. Records outside the current week
/// contribute nothing, so a fresh week starts at all zeroes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub days: Vec<DayCount>,
}

/// Lifetime totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    /// All completed sessions, any type.
    pub total_sessions: u64,
    /// Seconds of completed work sessions.
    pub total_focus_time: u64,
    /// Consecutive calendar days with a completion, ending today (or
    /// yesterday if today has none yet).
    pub current_streak: u32,
    /// Longest such run anywhere in the history.
    pub longest_streak: u32,
}

/// One immutable recomputation of all three views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub daily: DailyStats,
    pub weekly: WeeklyStats,
    pub total: TotalStats,
}

/// Midnight UTC of the day containing `t`.
fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Recomputes daily, weekly and lifetime statistics from the full history.
///
/// Pure and idempotent: the same records and `now` always produce the same
/// snapshot.
pub fn aggregate(records: &[SessionRecord], now: DateTime<Utc>) -> StatsSnapshot {
    let today_start = start_of_day(now);

    let mut daily = DailyStats::default();
    for record in records.iter().filter(|r| r.completed_at >= today_start) {
        daily.completed += 1;
        if record.session_type.is_work() {
            daily.focus_time += u64::from(record.duration);
        } else {
            daily.break_time += u64::from(record.duration);
        }
        daily.points_earned += u64::from(record.points_earned);
    }

    let week_start = today_start - Duration::days(i64::from(now.weekday().num_days_from_sunday()));
    let mut days = Vec::with_capacity(7);
    for offset in 0..7 {
        let day_start = week_start + Duration::days(offset);
        let day_end = day_start + Duration::days(1);
        let count = records
            .iter()
            .filter(|r| r.completed_at >= day_start && r.completed_at < day_end)
            .count() as u64;
        days.push(DayCount {
            day: day_start.format("%a").to_string(),
            count,
        });
    }
    let weekly = WeeklyStats { days };

    let total = TotalStats {
        total_sessions: records.len() as u64,
        total_focus_time: records
            .iter()
            .filter(|r| r.session_type.is_work())
            .map(|r| u64::from(r.duration))
            .sum(),
        current_streak: current_streak(records, now),
        longest_streak: longest_streak(records),
    };

    StatsSnapshot {
        daily,
        weekly,
        total,
    }
}
