use clap::Subcommand;
use focusgarden_core::SettingsPatch;

use super::{load_app, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value by wire name
    Get {
        /// Settings key (e.g. "workDuration", "darkMode")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings as JSON
    List,
}

pub async fn run(action: SettingsAction) -> CliResult {
    match action {
        SettingsAction::Get { key } => {
            let app = load_app().await?;
            println!("{}", app.settings().get_key(&key)?);
        }
        SettingsAction::Set { key, value } => {
            let mut app = load_app().await?;
            let mut patch = SettingsPatch::default();
            patch.set_key(&key, &value)?;
            app.update_settings(&patch).await?;
            println!("ok");
        }
        SettingsAction::List => {
            let app = load_app().await?;
            println!("{}", serde_json::to_string_pretty(app.settings())?);
        }
    }
    Ok(())
}
