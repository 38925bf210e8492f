use clap::Subcommand;

use super::{load_app, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's totals
    Today,
    /// Per-day session counts for the current week (Sunday first)
    Week,
    /// Lifetime totals and streaks
    All,
}

pub async fn run(action: StatsAction) -> CliResult {
    let app = load_app().await?;
    let stats = app.stats();

    match action {
        StatsAction::Today => {
            println!("{}", serde_json::to_string_pretty(&stats.daily)?);
        }
        StatsAction::Week => {
            println!("{}", serde_json::to_string_pretty(&stats.weekly)?);
        }
        StatsAction::All => {
            println!("{}", serde_json::to_string_pretty(&stats.total)?);
        }
    }
    Ok(())
}
