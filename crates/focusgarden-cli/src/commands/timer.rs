use clap::{Subcommand, ValueEnum};
use focusgarden_core::{Event, SessionDriver, SessionType};
use tokio::sync::broadcast::error::RecvError;

use super::{load_app, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum SessionTypeArg {
    Work,
    ShortBreak,
    LongBreak,
}

impl From<SessionTypeArg> for SessionType {
    fn from(arg: SessionTypeArg) -> Self {
        match arg {
            SessionTypeArg::Work => SessionType::Work,
            SessionTypeArg::ShortBreak => SessionType::ShortBreak,
            SessionTypeArg::LongBreak => SessionType::LongBreak,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown, keeping the remaining time
    Pause,
    /// Reload the full duration of the current session type
    Reset,
    /// Switch session type without recording a completion
    SetType {
        /// Session type to switch to
        session_type: SessionTypeArg,
    },
    /// Print the current timer state as JSON
    Status,
    /// Drive the countdown live, printing events as they happen
    Run {
        /// Number of sessions to complete before exiting
        #[arg(long, default_value = "1")]
        sessions: u32,
    },
}

pub async fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Start => {
            let mut app = load_app().await?;
            match app.start().await? {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                // Already running, or sitting at zero awaiting a reset.
                None => println!("{}", serde_json::to_string_pretty(&app.snapshot())?),
            }
        }
        TimerAction::Pause => {
            let mut app = load_app().await?;
            match app.pause().await? {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{}", serde_json::to_string_pretty(&app.snapshot())?),
            }
        }
        TimerAction::Reset => {
            let mut app = load_app().await?;
            let event = app.reset().await?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::SetType { session_type } => {
            let mut app = load_app().await?;
            match app.set_session_type(session_type.into()).await? {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{}", serde_json::to_string_pretty(&app.snapshot())?),
            }
        }
        TimerAction::Status => {
            let app = load_app().await?;
            println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
        }
        TimerAction::Run { sessions } => {
            run_live(sessions).await?;
        }
    }
    Ok(())
}

/// Runs the real one-second ticker until `sessions` completions have been
/// recorded or the user interrupts with Ctrl-C.
async fn run_live(sessions: u32) -> CliResult {
    let app = load_app().await?;
    let driver = SessionDriver::new(app);
    let mut events = driver.subscribe();

    driver.start().await?;
    {
        // A countdown at zero stays idle; nothing to drive.
        let app = driver.app();
        let app = app.lock().await;
        if !app.engine().is_running() {
            println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
            return Ok(());
        }
    }

    let mut completed = 0u32;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                driver.pause().await?;
                break;
            }
            received = events.recv() => match received {
                Ok(event) => {
                    let is_completion = matches!(event, Event::SessionCompleted { .. });
                    println!("{}", serde_json::to_string(&event)?);
                    if is_completion {
                        completed += 1;
                        if completed >= sessions {
                            break;
                        }
                        driver.start().await?;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    }

    driver.shutdown().await;
    Ok(())
}
