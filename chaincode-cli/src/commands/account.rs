//! Account command - look up a single account record

use anyhow::Result;
use colored::Colorize;
use chaincode_core::OperationResult;

use super::{get_context, invocation_failed};
use crate::output;

pub fn run(id: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let registrar = ctx.dispatcher.registrar();
    let key = registrar.config().account_key(id);

    let account = registrar
        .get_account(id)
        .map_err(|e| invocation_failed("account", &e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(account))?);
        return Ok(());
    }

    let Some(account) = account else {
        output::warning(&format!("No account stored under {}", key));
        return Ok(());
    };

    println!("{}", format!("Account {}", account.id).bold());
    let mut table = output::create_table();
    table.add_row(vec!["Key".to_string(), key]);
    table.add_row(vec!["Prefix".to_string(), account.prefix.clone()]);
    table.add_row(vec![
        "Cash Balance".to_string(),
        output::format_balance(account.cash_balance),
    ]);
    table.add_row(vec![
        "Assets".to_string(),
        if account.asset_ids.is_empty() {
            "none".dimmed().to_string()
        } else {
            account.asset_ids.join(", ")
        },
    ]);
    println!("{}", table);

    Ok(())
}
