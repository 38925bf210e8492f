//! One-second tick scheduler for a live [`FocusApp`].
//!
//! The engine itself is tick-driven and owns no threads; this driver supplies
//! the ticks. A single spawned task runs a `tokio::time::interval` loop and
//! calls [`FocusApp::tick`] under the app mutex, so the whole completion
//! pipeline (ledger append, stats recompute, garden growth, persistence) has
//! finished before the next tick can fire. Pausing or shutting down aborts
//! the ticker task; there is no window where a stale interval can still
//! advance the clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use crate::app::FocusApp;
use crate::error::Result;
use crate::events::Event;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Drives a [`FocusApp`] with periodic ticks and fans its events out to
/// subscribers.
///
/// Cloning is cheap; clones share the app, the ticker and the event channel.
#[derive(Clone)]
pub struct SessionDriver {
    app: Arc<Mutex<FocusApp>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    events: broadcast::Sender<Event>,
}

impl SessionDriver {
    /// Wraps an app with the real one-second cadence.
    pub fn new(app: FocusApp) -> Self {
        Self::with_tick_interval(app, Duration::from_secs(1))
    }

    /// Wraps an app with a custom cadence (tests shrink it to milliseconds).
    pub fn with_tick_interval(app: FocusApp, tick_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            app: Arc::new(Mutex::new(app)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
            events,
        }
    }

    /// Shared handle to the underlying app, for queries and non-timer
    /// commands while the driver runs.
    pub fn app(&self) -> Arc<Mutex<FocusApp>> {
        self.app.clone()
    }

    /// New receiver for every event the driver emits: a snapshot per tick
    /// while running, plus the engine's own lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Starts (or resumes) the countdown and the ticker task behind it.
    ///
    /// Returns the `SessionStarted` event, or `None` when the engine did not
    /// transition (it was already running, or sits at zero awaiting a
    /// reset). An engine rehydrated in the running state gets its ticker
    /// back here even though no event is emitted.
    pub async fn start(&self) -> Result<Option<Event>> {
        let (event, running) = {
            let mut app = self.app.lock().await;
            let event = app.start().await?;
            (event, app.engine().is_running())
        };
        if let Some(event) = &event {
            self.forward(event.clone());
        }
        if running {
            self.spawn_ticker().await;
        }
        Ok(event)
    }

    /// Pauses the countdown, halting the ticker first so no tick can land
    /// after the pause is observed.
    pub async fn pause(&self) -> Result<Option<Event>> {
        self.cancel_ticker().await;
        let event = {
            let mut app = self.app.lock().await;
            app.pause().await?
        };
        if let Some(event) = &event {
            self.forward(event.clone());
        }
        Ok(event)
    }

    /// Halts the ticker and reloads the full duration of the active type.
    pub async fn reset(&self) -> Result<Event> {
        self.cancel_ticker().await;
        let event = {
            let mut app = self.app.lock().await;
            app.reset().await?
        };
        self.forward(event.clone());
        Ok(event)
    }

    /// Stops the ticker task. The app state is left as it is.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
        info!("session driver shut down");
    }

    async fn spawn_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let app = self.app.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first interval tick completes immediately; consume it so
            // the countdown loses its first second a full period from now.
            interval.tick().await;
            loop {
                interval.tick().await;

                let mut app = app.lock().await;
                if !app.engine().is_running() {
                    debug!("engine idle, ticker stopping");
                    break;
                }
                match app.tick().await {
                    Some(event) => {
                        let _ = events.send(event);
                        // A completion leaves the engine idle; the next
                        // iteration exits the loop.
                    }
                    None => {
                        let _ = events.send(app.snapshot());
                    }
                }
            }
        });

        *guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn forward(&self, event: Event) {
        // No subscribers is fine; events are a courtesy, not a contract.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsPatch;
    use crate::storage::Store;
    use crate::timer::SessionType;

    async fn test_app(work_secs: u32) -> FocusApp {
        let store = Store::open_memory().unwrap();
        let mut app = FocusApp::load(store).await.unwrap();
        let patch = SettingsPatch {
            work_duration: Some(work_secs),
            short_break_duration: Some(300),
            long_break_duration: Some(300),
            ..Default::default()
        };
        app.update_settings(&patch).await.unwrap();
        app
    }

    #[tokio::test]
    async fn ticker_advances_the_countdown() {
        let app = test_app(300).await;
        let driver = SessionDriver::with_tick_interval(app, Duration::from_millis(2));
        driver.start().await.unwrap();

        time::sleep(Duration::from_millis(60)).await;
        driver.shutdown().await;

        let app = driver.app();
        let app = app.lock().await;
        assert!(app.engine().time_left_secs() < 300);
    }

    #[tokio::test]
    async fn pause_halts_the_ticker_deterministically() {
        let app = test_app(300).await;
        let driver = SessionDriver::with_tick_interval(app, Duration::from_millis(2));
        driver.start().await.unwrap();
        time::sleep(Duration::from_millis(20)).await;

        let paused = driver.pause().await.unwrap();
        assert!(matches!(paused, Some(Event::SessionPaused { .. })));
        let frozen = {
            let app = driver.app();
            let time_left = app.lock().await.engine().time_left_secs();
            time_left
        };

        // No orphaned ticks after the pause.
        time::sleep(Duration::from_millis(40)).await;
        let app = driver.app();
        let app = app.lock().await;
        assert_eq!(app.engine().time_left_secs(), frozen);
        assert!(!app.engine().is_running());
    }

    #[tokio::test]
    async fn completion_event_reaches_subscribers() {
        let app = test_app(300).await;
        let driver = SessionDriver::with_tick_interval(app, Duration::from_micros(500));
        let mut events = driver.subscribe();
        driver.start().await.unwrap();

        let completed = time::timeout(Duration::from_secs(30), async {
            loop {
                match events.recv().await {
                    Ok(event @ Event::SessionCompleted { .. }) => break event,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => panic!("channel closed"),
                }
            }
        })
        .await
        .expect("no completion within timeout");

        match completed {
            Event::SessionCompleted {
                completed,
                points,
                next_type,
                ..
            } => {
                assert_eq!(completed, SessionType::Work);
                assert_eq!(points, 25);
                assert_eq!(next_type, SessionType::ShortBreak);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }

        driver.shutdown().await;
        let app = driver.app();
        let app = app.lock().await;
        assert_eq!(app.ledger().records().len(), 1);
        assert_eq!(app.garden().points(), 25);
        assert!(!app.engine().is_running());
    }

    #[tokio::test]
    async fn start_while_running_is_a_noop() {
        let app = test_app(300).await;
        let driver = SessionDriver::with_tick_interval(app, Duration::from_millis(2));
        assert!(driver.start().await.unwrap().is_some());
        assert!(driver.start().await.unwrap().is_none());
        driver.shutdown().await;
    }

    #[tokio::test]
    async fn reset_halts_ticker_and_reloads_duration() {
        let app = test_app(300).await;
        let driver = SessionDriver::with_tick_interval(app, Duration::from_millis(2));
        driver.start().await.unwrap();
        time::sleep(Duration::from_millis(20)).await;

        let event = driver.reset().await.unwrap();
        assert!(matches!(event, Event::SessionReset { .. }));

        time::sleep(Duration::from_millis(20)).await;
        let app = driver.app();
        let app = app.lock().await;
        assert_eq!(app.engine().time_left_secs(), 300);
        assert!(!app.engine().is_running());
    }
}
