//! Status command - world-state summary

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "World State".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Keys".to_string(), status.total_keys.to_string()]);
    table.add_row(vec!["Accounts".to_string(), status.total_accounts.to_string()]);
    table.add_row(vec![
        format!("Sentinel ({})", status.sentinel_key),
        status
            .sentinel
            .clone()
            .unwrap_or_else(|| "not initialized".to_string()),
    ]);
    if let Some(path) = ctx.store.db_path() {
        table.add_row(vec!["Database".to_string(), path.display().to_string()]);
    }
    println!("{}", table);

    if status.unreadable_accounts > 0 {
        println!();
        output::warning(&format!(
            "{} record(s) under {} could not be decoded",
            status.unreadable_accounts, ctx.config.account_prefix
        ));
    }

    if !status.accounts.is_empty() {
        println!();
        println!("{}", "Accounts".bold());
        let mut accounts = output::create_table();
        accounts.set_header(vec!["Id", "Prefix", "Cash Balance", "Assets"]);
        for account in &status.accounts {
            accounts.add_row(vec![
                account.id.clone(),
                account.prefix.clone(),
                output::format_balance(account.cash_balance),
                account.asset_count.to_string(),
            ]);
        }
        println!("{}", accounts);
    }

    Ok(())
}
