//! Config command - show or change chaincode settings

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use chaincode_core::config::{Config, SETTINGS_FILE};

use super::get_chaincode_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change settings and write them to settings.json
    Set {
        /// Key namespace for account records
        #[arg(long)]
        account_prefix: Option<String>,
        /// Suffix appended to the id to form the account prefix
        #[arg(long)]
        account_suffix: Option<String>,
        /// Cash balance for new accounts
        #[arg(long)]
        initial_cash_balance: Option<f64>,
        /// Key written by `init`
        #[arg(long)]
        sentinel_key: Option<String>,
        /// World-state database file, relative to the chaincode directory
        #[arg(long)]
        state_file: Option<String>,
        /// Diagnostic log filter (e.g. `info`, `chaincode_core=debug`)
        #[arg(long)]
        log_filter: Option<String>,
    },
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    let chaincode_dir = get_chaincode_dir();
    let mut config = Config::load(&chaincode_dir)?;

    match command {
        Some(ConfigCommands::Set {
            account_prefix,
            account_suffix,
            initial_cash_balance,
            sentinel_key,
            state_file,
            log_filter,
        }) => {
            if account_prefix.is_none()
                && account_suffix.is_none()
                && initial_cash_balance.is_none()
                && sentinel_key.is_none()
                && state_file.is_none()
                && log_filter.is_none()
            {
                bail!("Nothing to change. See `chaincode config set --help`.");
            }
            if let Some(balance) = initial_cash_balance {
                if !balance.is_finite() || balance < 0.0 {
                    bail!("Initial cash balance must be a non-negative number");
                }
                config.initial_cash_balance = balance;
            }
            if let Some(prefix) = account_prefix {
                config.account_prefix = prefix;
            }
            if let Some(suffix) = account_suffix {
                config.account_suffix = suffix;
            }
            if let Some(key) = sentinel_key {
                config.sentinel_key = key;
            }
            if let Some(file) = state_file {
                config.state_file = file;
            }
            if let Some(filter) = log_filter {
                config.log_filter = Some(filter);
            }

            std::fs::create_dir_all(&chaincode_dir)?;
            config.save(&chaincode_dir)?;
            output::success(&format!(
                "Saved {}",
                chaincode_dir.join(SETTINGS_FILE).display()
            ));
            if std::env::var("CHAINCODE_ACCOUNT_PREFIX").is_ok() {
                output::warning("CHAINCODE_ACCOUNT_PREFIX is set and overrides the saved account prefix");
            }
            Ok(())
        }
        Some(ConfigCommands::Show { json: true }) => {
            println!(
                "{}",
                serde_json::json!({
                    "accountPrefix": config.account_prefix,
                    "accountSuffix": config.account_suffix,
                    "initialCashBalance": config.initial_cash_balance,
                    "sentinelKey": config.sentinel_key,
                    "stateFile": config.state_file,
                    "logFilter": config.log_filter,
                })
            );
            Ok(())
        }
        Some(ConfigCommands::Show { json: false }) | None => {
            println!("{}", "Settings".bold());
            let mut table = output::create_table();
            table.add_row(vec!["Account prefix".to_string(), config.account_prefix.clone()]);
            table.add_row(vec!["Account suffix".to_string(), config.account_suffix.clone()]);
            table.add_row(vec![
                "Initial cash balance".to_string(),
                output::format_balance(config.initial_cash_balance),
            ]);
            table.add_row(vec!["Sentinel key".to_string(), config.sentinel_key.clone()]);
            table.add_row(vec!["State file".to_string(), config.state_file.clone()]);
            table.add_row(vec![
                "Log filter".to_string(),
                config.log_filter.clone().unwrap_or_else(|| "warn".to_string()),
            ]);
            println!("{}", table);
            Ok(())
        }
    }
}
