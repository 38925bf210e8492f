pub mod migrations;
mod store;

pub use store::{keys, Store};

use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Returns `~/.config/focusgarden[-dev]/` based on FOCUSGARDEN_ENV.
///
/// Set FOCUSGARDEN_ENV=dev to use the development data directory, or
/// FOCUSGARDEN_DATA_DIR to override the location entirely (integration
/// tests point it at a temp dir).
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    if let Ok(dir) = std::env::var("FOCUSGARDEN_DATA_DIR") {
        let dir = PathBuf::from(dir);
        ensure_dir(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir().ok_or(StoreError::NoDataDir)?.join(".config");

    let env = std::env::var("FOCUSGARDEN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusgarden-dev")
    } else {
        base_dir.join("focusgarden")
    };

    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir).map_err(|err| StoreError::PrepareFailed {
        path: dir.to_path_buf(),
        source: err,
    })
}
