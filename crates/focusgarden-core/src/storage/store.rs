//! Key-value store backed by SQLite.
//!
//! A single worker thread owns the rusqlite connection; every read and write
//! is queued onto it through a channel and answered over a oneshot reply.
//! That queue is what serializes concurrent access - callers never touch the
//! connection directly, so two tasks can hold [`Store`] clones and write the
//! same key without interleaving.
//!
//! Values are JSON documents stored as text. Collections (session history,
//! tasks, garden) are rewritten whole on every save, which keeps the format
//! trivially portable at the data sizes a focus timer produces.

use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::storage::migrations;

/// Well-known store keys.
pub mod keys {
    /// Validated duration settings.
    pub const SETTINGS: &str = "settings";
    /// Append-only completed session history.
    pub const SESSIONS: &str = "sessions";
    /// Task list.
    pub const TASKS: &str = "tasks";
    /// Planted garden state.
    pub const GARDEN: &str = "garden";
    /// Lifetime reward points balance.
    pub const POINTS: &str = "points";
    /// Derived level, stored alongside points.
    pub const LEVEL: &str = "level";
    /// Serialized session engine, kept current between process runs.
    pub const ENGINE: &str = "timer_state";
}

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("failed to send shutdown to store worker: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("failed to join store worker: {join_err:?}");
            }
        }
    }
}

/// Clonable handle to the store worker.
///
/// Cloning is cheap; all clones share one worker thread and one connection.
/// Dropping the last clone shuts the worker down.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Opens the store in the default data directory
    /// (`~/.config/focusgarden[-dev]/focusgarden.db`).
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved or the
    /// database cannot be opened and migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = super::data_dir()?.join("focusgarden.db");
        Self::open_at(path)
    }

    /// Opens the store at an explicit database path.
    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        Self::spawn_worker(Some(path))
    }

    /// Opens an in-memory store (used by tests; nothing survives drop).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::spawn_worker(None)
    }

    fn spawn_worker(path: Option<PathBuf>) -> Result<Self, StoreError> {
        let display_path = path
            .clone()
            .unwrap_or_else(|| PathBuf::from(":memory:"));

        if let Some(parent) = path.as_ref().and_then(|p| p.parent()) {
            std::fs::create_dir_all(parent).map_err(|err| StoreError::PrepareFailed {
                path: display_path.clone(),
                source: err,
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), StoreError>>();
        let path_for_worker = path.clone();
        let path_for_error = display_path.clone();

        let worker = thread::Builder::new()
            .name("focusgarden-store".into())
            .spawn(move || {
                let open_result = match &path_for_worker {
                    Some(p) => Connection::open(p),
                    None => Connection::open_in_memory(),
                };
                let mut conn = match open_result {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(StoreError::OpenFailed {
                            path: path_for_error,
                            source: err,
                        }));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    debug!("could not enable WAL mode: {err}");
                }

                let init = migrations::migrate(&conn)
                    .map_err(|err| StoreError::MigrationFailed(err.to_string()));
                if ready_tx.send(init).is_err() {
                    error!("store opener dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut conn),
                        StoreCommand::Shutdown => break,
                    }
                }

                debug!("store worker shutting down");
            })
            .map_err(|err| StoreError::PrepareFailed {
                path: display_path.clone(),
                source: err,
            })?;

        ready_rx.recv().map_err(|_| StoreError::WorkerGone)??;

        info!("store opened at {}", display_path.display());

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    /// Runs a closure on the worker thread against the live connection and
    /// awaits its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("store caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|_| StoreError::WorkerGone)?;

        reply_rx.await.map_err(|_| StoreError::WorkerGone)?
    }

    /// Fetches the raw JSON text under `key`, if present.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.execute(move |conn| {
            let result = conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(StoreError::ReadFailed {
                    key,
                    message: err.to_string(),
                }),
            }
        })
        .await
    }

    /// Writes raw JSON text under `key`, replacing any previous value.
    pub async fn put_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|err| StoreError::WriteFailed {
                key,
                message: err.to_string(),
            })?;
            Ok(())
        })
        .await
    }

    /// Removes `key` from the store. Missing keys are not an error.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map_err(|err| StoreError::WriteFailed {
                    key,
                    message: err.to_string(),
                })?;
            Ok(())
        })
        .await
    }

    /// Fetches and decodes the value under `key`.
    ///
    /// Returns `Ok(None)` for a missing key and [`StoreError::Corrupted`]
    /// when the stored text does not parse as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_raw(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|err| {
                StoreError::Corrupted {
                    key: key.to_string(),
                    message: err.to_string(),
                }
            }),
        }
    }

    /// Fetches and decodes `key`, falling back to `T::default()` when the
    /// key is missing or its value no longer parses. A corrupt value is
    /// logged and discarded; the next save overwrites it.
    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StoreError> {
        match self.get(key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(T::default()),
            Err(StoreError::Corrupted { key, message }) => {
                warn!("discarding corrupted value under '{key}': {message}");
                Ok(T::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Encodes `value` as JSON and writes it under `key`.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|err| StoreError::WriteFailed {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        self.put_raw(key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = Store::open_memory().unwrap();
        let value: Option<u32> = store.get("nope").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = Store::open_memory().unwrap();
        store.put(keys::POINTS, &130u32).await.unwrap();
        let value: Option<u32> = store.get(keys::POINTS).await.unwrap();
        assert_eq!(value, Some(130));
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let store = Store::open_memory().unwrap();
        store.put(keys::LEVEL, &1u32).await.unwrap();
        store.put(keys::LEVEL, &2u32).await.unwrap();
        let value: Option<u32> = store.get(keys::LEVEL).await.unwrap();
        assert_eq!(value, Some(2));
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = Store::open_memory().unwrap();
        store.put("gone", &true).await.unwrap();
        store.delete("gone").await.unwrap();
        let value: Option<bool> = store.get("gone").await.unwrap();
        assert!(value.is_none());
        // Deleting again is fine.
        store.delete("gone").await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_value_is_reported_not_swallowed() {
        let store = Store::open_memory().unwrap();
        store.put_raw(keys::SESSIONS, "not json".into()).await.unwrap();
        let err = store.get::<Vec<u32>>(keys::SESSIONS).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupted { .. }));
    }

    #[tokio::test]
    async fn clones_share_the_same_worker() {
        let store = Store::open_memory().unwrap();
        let clone = store.clone();
        clone.put("shared", &"yes").await.unwrap();
        let value: Option<String> = store.get("shared").await.unwrap();
        assert_eq!(value.as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn writes_from_many_tasks_all_land() {
        let store = Store::open_memory().unwrap();
        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(&format!("k{i}"), &i).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        for i in 0..16u32 {
            let value: Option<u32> = store.get(&format!("k{i}")).await.unwrap();
            assert_eq!(value, Some(i));
        }
    }

    #[tokio::test]
    async fn reopening_a_file_store_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusgarden.db");
        {
            let store = Store::open_at(path.clone()).unwrap();
            store.put(keys::POINTS, &45u32).await.unwrap();
        }
        let store = Store::open_at(path).unwrap();
        let value: Option<u32> = store.get(keys::POINTS).await.unwrap();
        assert_eq!(value, Some(45));
    }
}
