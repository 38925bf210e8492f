//! # Focusgarden Core Library
//!
//! This library provides the core business logic for the Focusgarden focus
//! timer: a Pomodoro-style session cycle with gamified garden rewards. All
//! operations are available through the standalone CLI binary; any GUI shell
//! is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Session Engine**: a tick-driven state machine that requires the
//!   caller (or the [`SessionDriver`]) to invoke `tick()` once per second
//! - **Reward Ledger**: append-only history of completed sessions; points
//!   are fixed by session type
//! - **Statistics**: pure recomputation of daily/weekly/lifetime views from
//!   the full history, including real consecutive-day streaks
//! - **Garden**: a point economy where seeds become plants that grow through
//!   five stages and never regress
//! - **Storage**: a SQLite-backed key to JSON store behind a single worker
//!   thread, so concurrent writes to one collection cannot interleave
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: countdown plus work/break cycle routing
//! - [`FocusApp`]: composition root wiring engine, ledger, stats, garden,
//!   tasks and settings to one [`Store`]
//! - [`SessionDriver`]: 1-second ticker with deterministic cancellation
//! - [`aggregate`]: pure statistics over the session history

pub mod app;
pub mod driver;
pub mod error;
pub mod events;
pub mod garden;
pub mod ledger;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod timer;

pub use app::FocusApp;
pub use driver::SessionDriver;
pub use error::{CoreError, GardenError, SettingsError, StoreError, TaskError};
pub use events::Event;
pub use garden::{find_seed, Garden, Plant, Seed, SEED_CATALOG};
pub use ledger::{RewardLedger, SessionRecord};
pub use settings::{Settings, SettingsPatch};
pub use stats::{aggregate, DailyStats, StatsSnapshot, TotalStats, WeeklyStats};
pub use storage::Store;
pub use tasks::{Task, TaskList, TaskPriority};
pub use timer::{SessionClock, SessionEngine, SessionPlan, SessionType};
