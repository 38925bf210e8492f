use clap::Subcommand;
use focusgarden_core::SEED_CATALOG;

use super::{load_app, CliResult};

#[derive(Subcommand)]
pub enum GardenAction {
    /// Print plants, points and level as JSON
    Show,
    /// List the seed catalog
    Seeds,
    /// Buy a seed by id and plant it
    Plant {
        /// Catalog id of the seed (e.g. "sunflower")
        seed_id: String,
    },
}

pub async fn run(action: GardenAction) -> CliResult {
    match action {
        GardenAction::Show => {
            let app = load_app().await?;
            let garden = app.garden();
            let json = serde_json::json!({
                "plants": garden.plants(),
                "points": garden.points(),
                "level": garden.level(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        GardenAction::Seeds => {
            println!("{}", serde_json::to_string_pretty(&SEED_CATALOG)?);
        }
        GardenAction::Plant { seed_id } => {
            let mut app = load_app().await?;
            let plant = app.plant_seed(&seed_id).await?;
            println!("{}", serde_json::to_string_pretty(&plant)?);
        }
    }
    Ok(())
}
