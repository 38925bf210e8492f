//! One-second countdown clock.
//!
//! The clock has no internal thread and no timer handle: the caller drives it
//! by calling [`SessionClock::tick`] once per logical second. Completion is
//! reported exactly once, on the tick that moves `time_left` to zero.

use serde::{Deserialize, Serialize};

/// Result of advancing the clock by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// The clock was not running; nothing happened.
    Idle,
    /// The countdown advanced and time remains.
    Running { time_left: u32 },
    /// The countdown just reached zero. Reported exactly once; the clock
    /// stops itself before returning this.
    Finished,
}

/// Countdown state for a single session.
///
/// Invariant: `0 <= time_left <= duration` for the duration it was last
/// reset to. The clock itself does not know session types or durations;
/// whoever resets it supplies the number of seconds to count down from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClock {
    time_left: u32,
    running: bool,
}

impl SessionClock {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            time_left: duration_secs,
            running: false,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin or resume the countdown.
    ///
    /// Returns `true` if the clock transitioned to running. Starting at zero
    /// is a no-op: a finished countdown must be reset before it can run
    /// again, otherwise completion could fire twice for one session.
    pub fn start(&mut self) -> bool {
        if self.running || self.time_left == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop the countdown, preserving the remaining time.
    ///
    /// Returns `true` if the clock was running.
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Stop the countdown and reload it with a fresh duration.
    pub fn reset(&mut self, duration_secs: u32) {
        self.running = false;
        self.time_left = duration_secs;
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> ClockTick {
        if !self.running {
            return ClockTick::Idle;
        }
        if self.time_left == 0 {
            // Should be unreachable (finishing stops the clock), but never
            // report a second completion for the same countdown.
            self.running = false;
            return ClockTick::Idle;
        }
        self.time_left -= 1;
        if self.time_left == 0 {
            self.running = false;
            ClockTick::Finished
        } else {
            ClockTick::Running {
                time_left: self.time_left,
            }
        }
    }
}
