//! Chaincode CLI - a local peer for the account chaincode

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, config, init, invoke, logs, query, status};

/// Run the account chaincode against a local world state
#[derive(Parser)]
#[command(name = "chaincode", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize (or reset) the ledger sentinel value
    Init {
        /// Value stored under the sentinel key
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke a chaincode function (init, write, read, createAccount)
    Invoke {
        /// Function name
        function: String,
        /// Function arguments
        args: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Query a read-only chaincode function
    Query {
        /// Function name
        function: String,
        /// Function arguments
        args: Vec<String>,
        /// Payload rendering
        #[arg(long, value_enum, default_value = "text")]
        format: output::PayloadFormat,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account (shorthand for `invoke createAccount <id>`)
    CreateAccount {
        /// Account holder id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single account record
    Account {
        /// Account holder id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show world-state summary and accounts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the invocation log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { value, json } => init::run(value, json),
        Commands::Invoke { function, args, json } => invoke::run(&function, args, json),
        Commands::Query { function, args, format, json } => query::run(&function, args, format, json),
        Commands::CreateAccount { id, json } => invoke::run("createAccount", vec![id], json),
        Commands::Account { id, json } => account::run(&id, json),
        Commands::Status { json } => status::run(json),
        Commands::Logs { command } => logs::run(command),
        Commands::Config { command } => config::run(command),
    }
}
