//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `plancoach chat`: interactive session, optionally exported to HTML
//! - `plancoach send "message"`: one-shot chat turn
//! - `plancoach toggle <plan_id> <task_idx>`: optimistic task toggle
//! - `plancoach goal <goal_type>`: save the health goal
//! - `plancoach stats`: activity summary
//! - `plancoach health`: config files, backend reachability, activity log
//! - `plancoach config show|init|set|reset`: configuration management

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::activity::logger::{self, ActivityLog};
use crate::activity::reporter::{self, Summary};
use crate::backend::{ChatBackend, TaskBackend};
use crate::backend::http::HttpBackend;
use crate::chat::{ChatSession, SessionOptions};
use crate::config;
use crate::dashboard::{self, TaskBoard, ToggleOutcome};
use crate::render::{Renderer, Tee};
use crate::render::html::HtmlRenderer;
use crate::render::terminal::TerminalRenderer;

const QUIT_COMMAND: &str = "/quit";
const EXPORT_TITLE: &str = "plancoach conversation";

/// Output format for `plancoach stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// plancoach chat / send
// ---------------------------------------------------------------------------

/// Run an interactive session on stdin until `/quit` or EOF.
pub fn run_chat(no_history: bool, export: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg.backend);
    let mut options = SessionOptions::from(&cfg.chat);
    if no_history {
        options.send_history = false;
    }
    let log = ActivityLog::from_config(&cfg.logging);

    println!(
        "{} {}",
        "Chatting with".dimmed(),
        backend.base_url().cyan()
    );
    println!("{}", format!("Type {QUIT_COMMAND} or press Ctrl-D to leave.").dimmed());
    println!();

    let terminal = TerminalRenderer::stdout(cfg.chat.markdown);
    match export {
        None => {
            let mut session = ChatSession::new(terminal, options).with_log(log);
            chat_loop(&mut session, &backend)
        }
        Some(path) => {
            let tee = Tee::new(terminal, HtmlRenderer::new(cfg.chat.markdown));
            let mut session = ChatSession::new(tee, options).with_log(log);
            chat_loop(&mut session, &backend)?;

            let (_, html) = session.into_renderer().into_parts();
            fs::write(path, html.to_document(EXPORT_TITLE))
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} Conversation exported to {}",
                "✓".green().bold(),
                path.display()
            );
            Ok(())
        }
    }
}

fn chat_loop<R: Renderer, B: ChatBackend + ?Sized>(
    session: &mut ChatSession<R>,
    backend: &B,
) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", ">".bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("failed to read from stdin")?;
        if line.trim() == QUIT_COMMAND {
            break;
        }

        session.input_mut().set_text(line);
        session.submit_input(backend);
    }

    Ok(())
}

/// Send one message. Returns `false` when the turn was rolled back (or
/// the message was blank).
pub fn run_send(message: &str) -> Result<bool> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg.backend);
    let mut session = ChatSession::new(
        TerminalRenderer::stdout(cfg.chat.markdown),
        SessionOptions::from(&cfg.chat),
    )
    .with_log(ActivityLog::from_config(&cfg.logging));

    let committed = session
        .submit(&backend, message)
        .is_some_and(|status| status.is_committed());
    Ok(committed)
}

// ---------------------------------------------------------------------------
// plancoach toggle / goal
// ---------------------------------------------------------------------------

/// Toggle one task. `done` is the state currently shown for it.
pub fn run_toggle(plan_id: u64, task_idx: usize, done: bool) -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg.backend);
    let log = ActivityLog::from_config(&cfg.logging);

    toggle_and_report(&backend, plan_id, task_idx, done, &log);
    Ok(())
}

fn toggle_and_report<B: TaskBackend + ?Sized>(
    backend: &B,
    plan_id: u64,
    task_idx: usize,
    done: bool,
    log: &ActivityLog,
) -> ToggleOutcome {
    let mut board = TaskBoard::single(plan_id, task_idx, done);
    let outcome = board.toggle(backend, task_idx, log);

    match &outcome {
        ToggleOutcome::Confirmed { completed } => {
            println!(
                "{} Task {} of plan {} marked {}",
                "✓".green().bold(),
                task_idx,
                plan_id,
                completion_label(*completed).bold()
            );
        }
        ToggleOutcome::Reverted { completed, alert } => {
            println!("{} {}", "✗".red().bold(), alert);
            println!(
                "  {}",
                format!("Task {task_idx} stays {}", completion_label(*completed)).dimmed()
            );
        }
        ToggleOutcome::Ignored => {}
    }

    outcome
}

fn completion_label(completed: bool) -> &'static str {
    if completed { "done" } else { "not done" }
}

/// Save the goal type. Failures only reach the activity log.
pub fn run_goal(goal_type: &str) -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg.backend);
    let log = ActivityLog::from_config(&cfg.logging);

    if dashboard::save_goal(&backend, goal_type, &log) {
        println!("{} Goal set to {}", "✓".green().bold(), goal_type.trim().bold());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// plancoach stats
// ---------------------------------------------------------------------------

/// Show activity statistics.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let log = logger::default_log_path()
        .map(ActivityLog::at)
        .unwrap_or_default();
    let entries = log.read_since_days(days);

    if entries.is_empty() {
        println!(
            "{}",
            "No activity yet. Chat with the coach to see stats.".yellow()
        );
        return Ok(());
    }

    let summary = reporter::summarize(&entries);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => print_stats_table(&summary, days),
    }

    Ok(())
}

fn print_stats_table(summary: &Summary, days: Option<u32>) {
    let title = match days {
        Some(days) => format!("plancoach Activity, Last {days} Days"),
        None => "plancoach Activity".to_string(),
    };
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(50));
    println!();

    let chat = &summary.chat;
    println!("{}", "Chat".bold().cyan());
    println!("  {} {}", "Turns:          ".bold(), chat.total());
    println!(
        "  {} {} ({:.0}%)",
        "Succeeded:      ".bold(),
        chat.success,
        summary.chat_success_pct()
    );
    println!("  {} {}", "Refused:        ".bold(), chat.business_error);
    println!("  {} {}", "Network errors: ".bold(), chat.transport_error);
    println!("  {} {}", "Plan updates:   ".bold(), chat.plan_updates);
    if let Some(ms) = summary.avg_latency_ms {
        println!("  {} {} ms", "Avg latency:    ".bold(), ms);
    }
    println!();

    println!("{}", "Dashboard".bold().cyan());
    println!(
        "  Toggles: {} confirmed, {}",
        summary.toggles_confirmed,
        reverted_label(summary.toggles_reverted)
    );
    println!(
        "  Goals:   {} saved, {} failed",
        summary.goals_saved, summary.goals_failed
    );
}

fn reverted_label(count: usize) -> colored::ColoredString {
    let text = format!("{count} reverted");
    if count > 0 { text.red() } else { text.normal() }
}

// ---------------------------------------------------------------------------
// plancoach health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability and the activity log.
pub fn run_health() -> Result<()> {
    println!("{}", "plancoach Health Check".bold().cyan());
    println!("{}", "=".repeat(50));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.plancoach/config.toml found"
        } else {
            "not found (run `plancoach config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".plancoach.toml found"
        } else {
            "not found (optional)"
        },
    );

    let backend = HttpBackend::from_config(&cfg.backend);
    let reachable = backend.is_reachable();
    print_health_item(
        "Backend",
        reachable,
        &if reachable {
            format!("reachable at {}", backend.base_url())
        } else {
            format!("not reachable at {}", backend.base_url())
        },
    );
    print_health_item(
        "Session cookie",
        cfg.backend.session_cookie.is_some(),
        if cfg.backend.session_cookie.is_some() {
            "configured"
        } else {
            "not set; the service will refuse most requests"
        },
    );

    print_health_item(
        "Activity logging",
        cfg.logging.enabled,
        if cfg.logging.enabled { "enabled" } else { "disabled" },
    );
    let log = logger::default_log_path()
        .map(ActivityLog::at)
        .unwrap_or_default();
    let log_exists = log.path().is_some_and(|p| p.exists());
    print_health_item(
        "Activity log",
        log_exists,
        &if log_exists {
            format!("{} entries", log.read_all().len())
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// plancoach config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective plancoach Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.plancoach/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.plancoach/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".plancoach.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".plancoach.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "PLANCOACH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.plancoach/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Set backend.session_cookie to your logged-in session.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{StatusReply, ToggleRequest};

    #[test]
    fn output_format_defaults_to_table() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
    }

    struct Offline;

    impl TaskBackend for Offline {
        fn toggle_task(&self, _request: &ToggleRequest) -> Result<StatusReply> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn toggle_accepts_the_largest_task_index() {
        let outcome = toggle_and_report(&Offline, 1, usize::MAX, false, &ActivityLog::disabled());
        assert!(matches!(outcome, ToggleOutcome::Reverted { completed: false, .. }));
    }

    #[test]
    fn completion_labels() {
        assert_eq!(completion_label(true), "done");
        assert_eq!(completion_label(false), "not done");
    }
}
