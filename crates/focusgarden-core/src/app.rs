//! Application state: engine, ledger, stats, garden, tasks and settings
//! wired to one store.
//!
//! [`FocusApp`] owns every component and keeps them consistent: completion
//! events flow ledger -> stats -> garden in that order, and each mutation is
//! written back to the store before the call returns. State lives in memory
//! first; if a write fails the in-memory state is already updated and the
//! next successful save rewrites the whole collection, so callers may log
//! the error and carry on.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{CoreError, GardenError, Result};
use crate::events::Event;
use crate::garden::{find_seed, Garden, Plant};
use crate::ledger::RewardLedger;
use crate::settings::{Settings, SettingsPatch};
use crate::stats::{aggregate, StatsSnapshot};
use crate::storage::{keys, Store};
use crate::tasks::{Task, TaskList};
use crate::timer::{SessionEngine, SessionType};

/// Composition root. One instance per process.
pub struct FocusApp {
    store: Store,
    engine: SessionEngine,
    settings: Settings,
    ledger: RewardLedger,
    garden: Garden,
    tasks: TaskList,
    stats: StatsSnapshot,
}

impl FocusApp {
    /// Hydrates the full application state from the store.
    ///
    /// Settings come first so a fresh engine starts with the configured
    /// durations. A persisted engine resumes exactly where it stopped,
    /// mid-countdown included; its replay guard is handed to the ledger so
    /// completions from before this process cannot be recorded twice.
    pub async fn load(store: Store) -> Result<Self> {
        let settings = Settings::load(&store).await?;

        let engine = match store.get::<SessionEngine>(keys::ENGINE).await {
            Ok(Some(engine)) => engine,
            Ok(None) => SessionEngine::with_plan(settings.plan()),
            Err(crate::error::StoreError::Corrupted { key, message }) => {
                warn!("discarding corrupted engine state under '{key}': {message}");
                SessionEngine::with_plan(settings.plan())
            }
            Err(err) => return Err(err.into()),
        };

        let mut ledger = RewardLedger::load(&store).await?;
        ledger.mark_recorded_through(engine.completion_seq());

        let garden = Garden::load(&store).await?;
        let tasks = TaskList::load(&store).await?;
        let stats = aggregate(ledger.records(), Utc::now());

        let mut app = Self {
            store,
            engine,
            settings,
            ledger,
            garden,
            tasks,
            stats,
        };
        // A settings change saved by an earlier process reaches a persisted
        // engine here, at the latest.
        app.engine.apply_plan(app.settings.plan());
        Ok(app)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &StatsSnapshot {
        &self.stats
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Point-in-time snapshot event of the engine state.
    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub async fn start(&mut self) -> Result<Option<Event>> {
        let event = self.engine.start();
        self.persist_engine().await?;
        Ok(event)
    }

    pub async fn pause(&mut self) -> Result<Option<Event>> {
        let event = self.engine.pause();
        self.persist_engine().await?;
        Ok(event)
    }

    pub async fn reset(&mut self) -> Result<Event> {
        let event = self.engine.reset();
        self.persist_engine().await?;
        Ok(event)
    }

    pub async fn set_session_type(&mut self, session_type: SessionType) -> Result<Option<Event>> {
        let event = self.engine.set_session_type(session_type);
        self.persist_engine().await?;
        Ok(event)
    }

    /// Advances the countdown by one second and runs the completion
    /// pipeline when a session finishes.
    ///
    /// On completion the in-memory state settles first: the ledger appends
    /// a record, statistics are recomputed, and the garden is credited and
    /// grown, in that order. Only then are the collections written back; a
    /// failed write is logged and the countdown carries on with the updated
    /// in-memory state (the next successful save rewrites the whole
    /// collection). Replayed completions are dropped by the ledger and
    /// trigger no side effects.
    pub async fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick();

        if let Some(Event::SessionCompleted {
            completed,
            duration_secs,
            points,
            sequence,
            next_type,
            at,
            ..
        }) = &event
        {
            let recorded = self
                .ledger
                .record_completion(*sequence, *completed, *duration_secs, *at)
                .is_some();
            if recorded {
                info!(
                    "{} session completed (+{points} points), next up {}",
                    completed.label(),
                    next_type.label()
                );
                self.stats = aggregate(self.ledger.records(), *at);
                self.garden.add_points(*points, *at);

                if let Err(err) = self.ledger.save(&self.store).await {
                    warn!("failed to persist session history: {err}");
                }
                if let Err(err) = self.garden.save(&self.store).await {
                    warn!("failed to persist garden: {err}");
                }
            }
        }

        if let Err(err) = self.persist_engine().await {
            warn!("failed to persist engine state: {err}");
        }
        event
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Applies a settings patch, persists it and stages the new durations.
    ///
    /// The engine picks the new plan up at its next session boundary; an
    /// active countdown keeps its remaining time.
    pub async fn update_settings(&mut self, patch: &SettingsPatch) -> Result<()> {
        self.settings.apply(patch)?;
        self.settings.save(&self.store).await?;
        self.engine.apply_plan(self.settings.plan());
        self.persist_engine().await?;
        Ok(())
    }

    // ── Garden ───────────────────────────────────────────────────────

    /// Buys a seed by catalog id and plants it.
    pub async fn plant_seed(&mut self, seed_id: &str) -> Result<Plant> {
        let seed = find_seed(seed_id)
            .ok_or_else(|| CoreError::Garden(GardenError::UnknownSeed(seed_id.to_string())))?;
        let plant = self.garden.plant_seed(seed, Utc::now())?;
        self.garden.save(&self.store).await?;
        Ok(plant)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub async fn add_task(&mut self, task: Task) -> Result<Task> {
        let task = self.tasks.add(task).clone();
        self.tasks.save(&self.store).await?;
        Ok(task)
    }

    pub async fn toggle_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.toggle(id, Utc::now())?.clone();
        self.tasks.save(&self.store).await?;
        Ok(task)
    }

    pub async fn remove_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.remove(id)?;
        self.tasks.save(&self.store).await?;
        Ok(task)
    }

    pub async fn increment_task_pomodoro(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.increment_pomodoro(id)?.clone();
        self.tasks.save(&self.store).await?;
        Ok(task)
    }

    async fn persist_engine(&self) -> Result<()> {
        self.store.put(keys::ENGINE, &self.engine).await?;
        Ok(())
    }
}
