//! Logs command - view and manage the invocation log

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_chaincode_dir;
use crate::output;
use chaincode_core::services::logging::now_ms;
use chaincode_core::LoggingService;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent invocations
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only failed invocations
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Prune the invocation log
    Prune {
        /// Keep entries from the last N days
        #[arg(long, default_value = "30", conflicts_with = "all")]
        keep_days: u64,
        /// Remove every entry
        #[arg(long)]
        all: bool,
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Calls and failures per chaincode function
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_logging_service() -> Result<LoggingService> {
    let chaincode_dir = get_chaincode_dir();
    std::fs::create_dir_all(&chaincode_dir)?;
    LoggingService::new(&chaincode_dir, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(timestamp_ms) {
        Some(at) => at.with_timezone(&chrono::Local).format("%b %d %H:%M:%S").to_string(),
        None => format!("@{}", timestamp_ms),
    }
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List { limit, errors, json } => {
            let service = get_logging_service()?;
            let entries = if errors {
                service.get_errors(limit)?
            } else {
                service.get_recent(limit)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Entry", "Function", "Args", "Result"]);

            for entry in entries {
                let outcome = match &entry.error_message {
                    Some(message) => message.red().to_string(),
                    None => "ok".green().to_string(),
                };
                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.entry_point,
                    entry.function.unwrap_or_else(|| entry.event.clone()),
                    entry.arg_count.map(|n| n.to_string()).unwrap_or_default(),
                    outcome,
                ]);
            }

            println!("{}", table);
        }
        LogsCommands::Prune { keep_days, all, yes } => {
            let service = get_logging_service()?;
            let (cutoff_ms, scope) = if all {
                (i64::MAX, "all invocation log entries".to_string())
            } else {
                let keep_ms = (keep_days as i64).saturating_mul(86_400_000);
                (
                    now_ms().saturating_sub(keep_ms),
                    format!("invocation log entries older than {} day(s)", keep_days),
                )
            };

            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt(format!("Remove {}?", scope))
                    .default(false)
                    .interact()?;
            if !confirmed {
                output::warning("Nothing removed");
                return Ok(());
            }

            let removed = service.delete_before(cutoff_ms)?;
            output::success(&format!("Removed {} of {}", removed, scope));
        }
        LogsCommands::Stats { json } => {
            let service = get_logging_service()?;
            let per_function = service.function_stats()?;
            let failures: u64 = per_function.iter().map(|s| s.failures).sum();

            if json {
                let summary = serde_json::json!({
                    "entries": service.count()?,
                    "failures": failures,
                    "functions": per_function,
                    "database": service.db_path(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            if per_function.is_empty() {
                println!("No invocations recorded in {}", service.db_path().display());
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Function", "Calls", "Failures", "Failure Rate"]);
            for stats in &per_function {
                let rate = stats.failures as f64 * 100.0 / stats.calls as f64;
                let failures = if stats.failures > 0 {
                    stats.failures.to_string().red().to_string()
                } else {
                    "0".to_string()
                };
                table.add_row(vec![
                    stats.function.clone(),
                    stats.calls.to_string(),
                    failures,
                    format!("{:.1}%", rate),
                ]);
            }
            println!("{}", table);
            println!(
                "{} failed invocation(s); log at {}",
                failures.to_string().bold(),
                service.db_path().display()
            );
        }
    }

    Ok(())
}
