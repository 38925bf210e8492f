pub mod garden;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use focusgarden_core::{FocusApp, Store};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Opens the store in the data directory and hydrates the app from it.
pub async fn load_app() -> Result<FocusApp, Box<dyn std::error::Error>> {
    let store = Store::open()?;
    Ok(FocusApp::load(store).await?)
}
