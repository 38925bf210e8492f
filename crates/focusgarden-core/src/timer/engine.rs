//! Session cycle controller.
//!
//! [`SessionEngine`] wraps a [`SessionClock`] and layers the Pomodoro cycle on
//! top of it: which session type is active, how many work sessions have been
//! started so far, and which session comes next when the countdown finishes.
//! Like the clock it is tick-driven and owns no threads - a driver calls
//! `tick()` once per second and routes the returned events.
//!
//! ## Cycle routing
//!
//! Work sessions are numbered from 1. When work session `n` completes, the
//! engine routes to a long break if `n` is a multiple of
//! [`SESSIONS_PER_CYCLE`], otherwise to a short break. Completing any break
//! routes back to work. The session counter only advances on *work*
//! completions, so abandoning a session (via [`SessionEngine::set_session_type`]
//! or [`SessionEngine::reset`]) never moves the cycle forward.
//!
//! ## Usage
//!
//! ```
//! use focusgarden_core::timer::SessionEngine;
//!
//! let mut engine = SessionEngine::new();
//! engine.start();
//! // ... once per second ...
//! if let Some(_event) = engine.tick() {
//!     // SessionCompleted carries points and the next session type
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::timer::clock::{ClockTick, SessionClock};
use crate::timer::plan::{SessionPlan, SessionType};

/// Work sessions per cycle; every `SESSIONS_PER_CYCLE`-th work completion
/// routes to a long break.
pub const SESSIONS_PER_CYCLE: u32 = 4;

/// Tick-driven Pomodoro cycle state machine.
///
/// The whole engine serializes with serde so it can be persisted between
/// process runs and rehydrated mid-countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEngine {
    clock: SessionClock,
    session_type: SessionType,
    /// 1-based number of the work session currently in progress (or up next).
    current_session: u32,
    plan: SessionPlan,
    /// Duration changes staged while a countdown is mid-flight. Promoted to
    /// `plan` at the next session boundary so the active countdown is never
    /// disturbed.
    #[serde(default)]
    pending_plan: Option<SessionPlan>,
    /// Monotone completion counter, stamped into every `SessionCompleted`
    /// event so downstream consumers can deduplicate.
    #[serde(default)]
    completion_seq: u64,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    /// Creates an idle engine: work session 1, full work countdown loaded.
    pub fn new() -> Self {
        Self::with_plan(SessionPlan::default())
    }

    /// Creates an idle engine using the given plan.
    pub fn with_plan(plan: SessionPlan) -> Self {
        let session_type = SessionType::Work;
        Self {
            clock: SessionClock::new(plan.duration_secs(session_type)),
            session_type,
            current_session: 1,
            plan,
            pending_plan: None,
            completion_seq: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn current_session(&self) -> u32 {
        self.current_session
    }

    pub fn time_left_secs(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn plan(&self) -> SessionPlan {
        self.plan
    }

    /// Configured duration of the active session type under the active plan.
    pub fn duration_secs(&self) -> u32 {
        self.plan.duration_secs(self.session_type)
    }

    /// Highest completion sequence number stamped so far.
    pub fn completion_seq(&self) -> u64 {
        self.completion_seq
    }

    /// Fraction of the active session already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let duration = self.duration_secs();
        if duration == 0 {
            return 0.0;
        }
        1.0 - f64::from(self.clock.time_left()) / f64::from(duration)
    }

    /// Builds a point-in-time snapshot event describing the full engine state.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            session_type: self.session_type,
            current_session: self.current_session,
            running: self.clock.is_running(),
            time_left_secs: self.clock.time_left(),
            duration_secs: self.duration_secs(),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Starts (or resumes) the countdown.
    ///
    /// Returns `None` if the clock was already running or has no time left.
    pub fn start(&mut self) -> Option<Event> {
        if !self.clock.start() {
            return None;
        }
        Some(Event::SessionStarted {
            session_type: self.session_type,
            current_session: self.current_session,
            time_left_secs: self.clock.time_left(),
            at: Utc::now(),
        })
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns `None` if the clock was not running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.clock.pause() {
            return None;
        }
        Some(Event::SessionPaused {
            session_type: self.session_type,
            time_left_secs: self.clock.time_left(),
            at: Utc::now(),
        })
    }

    /// Stops the countdown and reloads the full duration of the active
    /// session type. The cycle position is untouched and nothing is recorded.
    pub fn reset(&mut self) -> Event {
        self.promote_pending_plan();
        self.clock.reset(self.duration_secs());
        Event::SessionReset {
            session_type: self.session_type,
            time_left_secs: self.clock.time_left(),
            at: Utc::now(),
        }
    }

    /// Switches to another session type, abandoning the active countdown.
    ///
    /// Always force-pauses first. Selecting the already-active type only
    /// pauses (remaining time survives); selecting a different type reloads
    /// that type's full duration. No completion is recorded either way.
    pub fn set_session_type(&mut self, session_type: SessionType) -> Option<Event> {
        let was_running = self.clock.pause();
        if session_type == self.session_type {
            if !was_running {
                return None;
            }
            return Some(Event::SessionPaused {
                session_type: self.session_type,
                time_left_secs: self.clock.time_left(),
                at: Utc::now(),
            });
        }
        self.session_type = session_type;
        self.promote_pending_plan();
        self.clock.reset(self.duration_secs());
        Some(Event::SessionTypeChanged {
            session_type: self.session_type,
            current_session: self.current_session,
            time_left_secs: self.clock.time_left(),
            at: Utc::now(),
        })
    }

    /// Stages a new duration plan.
    ///
    /// While the engine is mid-countdown the plan is held pending and only
    /// promoted at the next session boundary (completion, reset or type
    /// change). An idle engine sitting at a fresh countdown adopts it
    /// immediately.
    pub fn apply_plan(&mut self, plan: SessionPlan) {
        if plan == self.plan {
            self.pending_plan = None;
            return;
        }
        let at_boundary =
            !self.clock.is_running() && self.clock.time_left() == self.duration_secs();
        if at_boundary {
            self.plan = plan;
            self.pending_plan = None;
            self.clock.reset(self.duration_secs());
        } else {
            self.pending_plan = Some(plan);
        }
    }

    /// Advances the countdown by one second.
    ///
    /// Returns `Some(SessionCompleted)` exactly once per finished session;
    /// `None` on every other tick. On completion the engine routes to the
    /// next session type per the cycle rules and loads its full duration,
    /// leaving the clock idle until the next `start()`.
    pub fn tick(&mut self) -> Option<Event> {
        match self.clock.tick() {
            ClockTick::Idle | ClockTick::Running { .. } => None,
            ClockTick::Finished => Some(self.complete_session()),
        }
    }

    fn complete_session(&mut self) -> Event {
        let completed = self.session_type;
        let duration_secs = self.duration_secs();
        let points = completed.points();
        self.completion_seq += 1;

        let next_type = if completed.is_work() {
            let finished = self.current_session;
            self.current_session += 1;
            if finished % SESSIONS_PER_CYCLE == 0 {
                SessionType::LongBreak
            } else {
                SessionType::ShortBreak
            }
        } else {
            SessionType::Work
        };

        self.session_type = next_type;
        self.promote_pending_plan();
        self.clock.reset(self.duration_secs());

        Event::SessionCompleted {
            completed,
            duration_secs,
            points,
            sequence: self.completion_seq,
            next_type,
            current_session: self.current_session,
            at: Utc::now(),
        }
    }

    fn promote_pending_plan(&mut self) {
        if let Some(plan) = self.pending_plan.take() {
            self.plan = plan;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_plan() -> SessionPlan {
        SessionPlan {
            work_secs: 3,
            short_break_secs: 2,
            long_break_secs: 4,
        }
    }

    /// Starts the engine and ticks until it reports a completion.
    fn run_to_completion(engine: &mut SessionEngine) -> Event {
        engine.start();
        for _ in 0..10_000 {
            if let Some(event) = engine.tick() {
                return event;
            }
        }
        panic!("engine never completed");
    }

    #[test]
    fn new_engine_is_idle_work_session_one() {
        let engine = SessionEngine::new();
        assert_eq!(engine.session_type(), SessionType::Work);
        assert_eq!(engine.current_session(), 1);
        assert!(!engine.is_running());
        assert_eq!(engine.time_left_secs(), 25 * 60);
    }

    #[test]
    fn work_completion_advances_counter_and_routes_short_break() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        let event = run_to_completion(&mut engine);
        match event {
            Event::SessionCompleted {
                completed,
                duration_secs,
                points,
                sequence,
                next_type,
                current_session,
                ..
            } => {
                assert_eq!(completed, SessionType::Work);
                assert_eq!(duration_secs, 3);
                assert_eq!(points, 25);
                assert_eq!(sequence, 1);
                assert_eq!(next_type, SessionType::ShortBreak);
                assert_eq!(current_session, 2);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(engine.session_type(), SessionType::ShortBreak);
        assert!(!engine.is_running());
        assert_eq!(engine.time_left_secs(), 2);
    }

    #[test]
    fn break_completion_routes_back_to_work_without_advancing() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        run_to_completion(&mut engine); // work 1 done, now short break
        let event = run_to_completion(&mut engine);
        match event {
            Event::SessionCompleted {
                completed,
                points,
                next_type,
                current_session,
                ..
            } => {
                assert_eq!(completed, SessionType::ShortBreak);
                assert_eq!(points, 10);
                assert_eq!(next_type, SessionType::Work);
                assert_eq!(current_session, 2);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn fourth_work_completion_routes_long_break() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        // Three full work+break rounds, then the fourth work session.
        for _ in 0..3 {
            run_to_completion(&mut engine); // work
            run_to_completion(&mut engine); // break
        }
        assert_eq!(engine.current_session(), 4);
        let event = run_to_completion(&mut engine);
        match event {
            Event::SessionCompleted {
                completed,
                next_type,
                current_session,
                ..
            } => {
                assert_eq!(completed, SessionType::Work);
                assert_eq!(next_type, SessionType::LongBreak);
                assert_eq!(current_session, 5);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(engine.time_left_secs(), 4);
    }

    #[test]
    fn eighth_work_completion_routes_long_break_again() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        for _ in 0..7 {
            run_to_completion(&mut engine); // work n
            run_to_completion(&mut engine); // break
        }
        assert_eq!(engine.current_session(), 8);
        let event = run_to_completion(&mut engine);
        match event {
            Event::SessionCompleted { next_type, .. } => {
                assert_eq!(next_type, SessionType::LongBreak);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn set_session_type_abandons_without_completion() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        engine.start();
        engine.tick();
        let seq_before = engine.completion_seq();
        let event = engine.set_session_type(SessionType::LongBreak);
        assert!(matches!(event, Some(Event::SessionTypeChanged { .. })));
        assert_eq!(engine.session_type(), SessionType::LongBreak);
        assert!(!engine.is_running());
        assert_eq!(engine.time_left_secs(), 4);
        assert_eq!(engine.current_session(), 1);
        assert_eq!(engine.completion_seq(), seq_before);
    }

    #[test]
    fn set_same_session_type_only_pauses() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        engine.start();
        engine.tick();
        let event = engine.set_session_type(SessionType::Work);
        assert!(matches!(event, Some(Event::SessionPaused { .. })));
        assert!(!engine.is_running());
        // Remaining time survives, no reload to the full 3 seconds.
        assert_eq!(engine.time_left_secs(), 2);
    }

    #[test]
    fn set_same_session_type_while_idle_is_noop() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        assert!(engine.set_session_type(SessionType::Work).is_none());
        assert_eq!(engine.time_left_secs(), 3);
    }

    #[test]
    fn reset_reloads_duration_and_keeps_cycle_position() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        run_to_completion(&mut engine);
        engine.start();
        engine.tick();
        let event = engine.reset();
        assert!(matches!(event, Event::SessionReset { .. }));
        assert_eq!(engine.session_type(), SessionType::ShortBreak);
        assert_eq!(engine.time_left_secs(), 2);
        assert_eq!(engine.current_session(), 2);
    }

    #[test]
    fn plan_applies_immediately_at_session_boundary() {
        let mut engine = SessionEngine::new();
        engine.apply_plan(tiny_plan());
        assert_eq!(engine.time_left_secs(), 3);
        assert_eq!(engine.plan(), tiny_plan());
    }

    #[test]
    fn plan_change_mid_countdown_is_deferred_to_next_boundary() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        engine.start();
        engine.tick();
        engine.apply_plan(SessionPlan {
            work_secs: 10,
            short_break_secs: 5,
            long_break_secs: 20,
        });
        // Active countdown is untouched.
        assert_eq!(engine.time_left_secs(), 2);
        engine.tick();
        let event = engine.tick();
        assert!(matches!(event, Some(Event::SessionCompleted { .. })));
        // Next session already uses the new plan.
        assert_eq!(engine.session_type(), SessionType::ShortBreak);
        assert_eq!(engine.time_left_secs(), 5);
    }

    #[test]
    fn reapplying_active_plan_clears_pending_change() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        engine.start();
        engine.tick();
        engine.apply_plan(SessionPlan::default());
        engine.apply_plan(tiny_plan());
        engine.tick();
        engine.tick();
        // Completion promoted nothing; short break still 2 seconds.
        assert_eq!(engine.time_left_secs(), 2);
    }

    #[test]
    fn completion_sequence_is_monotone() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        for expected in 1..=5u64 {
            let event = run_to_completion(&mut engine);
            match event {
                Event::SessionCompleted { sequence, .. } => assert_eq!(sequence, expected),
                other => panic!("expected SessionCompleted, got {other:?}"),
            }
        }
    }

    #[test]
    fn engine_round_trips_through_serde() {
        let mut engine = SessionEngine::with_plan(tiny_plan());
        run_to_completion(&mut engine);
        engine.start();
        engine.tick();
        engine.pause();
        engine.apply_plan(SessionPlan::default());

        let json = serde_json::to_string(&engine).unwrap();
        let restored: SessionEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.session_type(), engine.session_type());
        assert_eq!(restored.current_session(), engine.current_session());
        assert_eq!(restored.time_left_secs(), engine.time_left_secs());
        assert_eq!(restored.is_running(), engine.is_running());
        assert_eq!(restored.completion_seq(), engine.completion_seq());
        assert_eq!(restored.plan(), engine.plan());
    }

    #[test]
    fn old_snapshots_without_new_fields_still_load() {
        // Fields added after the first release default cleanly.
        let json = r#"{
            "clock": { "time_left": 120, "running": false },
            "session_type": "work",
            "current_session": 3,
            "plan": { "work_secs": 1500, "short_break_secs": 300, "long_break_secs": 900 }
        }"#;
        let engine: SessionEngine = serde_json::from_str(json).unwrap();
        assert_eq!(engine.current_session(), 3);
        assert_eq!(engine.completion_seq(), 0);
    }
}
