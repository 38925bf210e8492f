mod clock;
mod engine;
mod plan;

pub use clock::{ClockTick, SessionClock};
pub use engine::{SessionEngine, SESSIONS_PER_CYCLE};
pub use plan::{SessionPlan, SessionType, BREAK_POINTS, WORK_POINTS};
