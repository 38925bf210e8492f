//! Consecutive-day completion streaks.
//!
//! A streak is a run of consecutive UTC calendar days that each have at
//! least one completed session of any type. The current streak counts back
//! from today; a day with no completion *yet* does not break it, so a streak
//! ending yesterday still counts until today is actually over.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::ledger::SessionRecord;

/// Distinct UTC days that have at least one completion.
fn completion_days(records: &[SessionRecord]) -> BTreeSet<NaiveDate> {
    records.iter().map(|r| r.completed_at.date_naive()).collect()
}

/// Length of the streak ending today (or yesterday, if today is still empty).
///
/// Returns 0 when the most recent completion is older than yesterday.
pub fn current_streak(records: &[SessionRecord], now: DateTime<Utc>) -> u32 {
    let days = completion_days(records);
    let today = now.date_naive();
    let yesterday = today - Duration::days(1);

    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 1;
    while days.contains(&(cursor - Duration::days(1))) {
        cursor -= Duration::days(1);
        streak += 1;
    }
    streak
}

/// Length of the longest consecutive-day run anywhere in the history.
pub fn longest_streak(records: &[SessionRecord]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in completion_days(records) {
        run = match prev {
            Some(p) if day == p + Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}
