use clap::{Subcommand, ValueEnum};
use focusgarden_core::{Task, TaskPriority};

use super::{load_app, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for TaskPriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => TaskPriority::Low,
            PriorityArg::Medium => TaskPriority::Medium,
            PriorityArg::High => TaskPriority::High,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Estimated pomodoros to finish
        #[arg(long, default_value = "1")]
        estimate: u32,
        /// Task priority
        #[arg(long, value_enum, default_value = "medium")]
        priority: PriorityArg,
        /// Free-form category label
        #[arg(long)]
        category: Option<String>,
    },
    /// List all tasks as JSON
    List,
    /// Toggle a task between open and completed
    Done {
        /// Task id
        id: String,
    },
    /// Remove a task
    Remove {
        /// Task id
        id: String,
    },
    /// Credit one completed pomodoro to a task
    Pomodoro {
        /// Task id
        id: String,
    },
}

pub async fn run(action: TaskAction) -> CliResult {
    let mut app = load_app().await?;

    match action {
        TaskAction::Add {
            title,
            description,
            estimate,
            priority,
            category,
        } => {
            let mut task = Task::new(title);
            task.description = description;
            task.estimated_pomodoros = estimate;
            task.priority = priority.into();
            task.category = category;
            let task = app.add_task(task).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List => {
            println!("{}", serde_json::to_string_pretty(&app.tasks().tasks())?);
        }
        TaskAction::Done { id } => {
            let task = app.toggle_task(&id).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Remove { id } => {
            let task = app.remove_task(&id).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Pomodoro { id } => {
            let task = app.increment_task_pomodoro(&id).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }
    Ok(())
}
