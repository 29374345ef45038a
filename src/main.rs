use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use plancoach::cli;

#[derive(Debug, Parser)]
#[command(name = "plancoach")]
#[command(about = "Terminal client for the daily plan coaching service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive chat with the coach; `/quit` or EOF ends the session
    Chat {
        /// Do not send recent turns along with each message
        #[arg(long)]
        no_history: bool,
        /// Also write the conversation to a standalone HTML file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Send a single message and print the reply
    Send {
        /// The message text
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Toggle the completion state of one task in a plan
    Toggle {
        plan_id: u64,
        task_idx: usize,
        /// The task is currently shown as completed
        #[arg(long)]
        done: bool,
    },
    /// Save the health goal type for the logged-in user
    Goal { goal_type: String },
    /// Show activity statistics
    Stats {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check config files, backend reachability and the activity log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default global config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value in the global config file, e.g. `backend.timeout_ms 5000`
    Set { key: String, value: String },
    /// Restore the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Chat { no_history, export } => cli::run_chat(no_history, export.as_deref()),
        Commands::Send { message } => {
            let text = message.join(" ");
            if !cli::run_send(&text)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Toggle {
            plan_id,
            task_idx,
            done,
        } => cli::run_toggle(plan_id, task_idx, done),
        Commands::Goal { goal_type } => cli::run_goal(&goal_type),
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
