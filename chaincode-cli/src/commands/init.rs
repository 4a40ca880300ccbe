//! Init command - reset the ledger sentinel value

use anyhow::Result;
use chaincode_core::{EntryPoint, OperationResult};

use super::{get_context, get_logger, invocation_failed, log_outcome};
use crate::output;

pub fn run(value: String, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let args = vec![value];
    let result = ctx.dispatcher.init(&args);
    let sentinel_key = ctx.dispatcher.state().sentinel_key();
    log_outcome(&logger, EntryPoint::Init, "init", args.len(), &result);

    if json {
        let out: OperationResult<String> = match &result {
            Ok(()) => OperationResult::ok(sentinel_key.to_string()),
            Err(e) => OperationResult::fail(e.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    }

    match result {
        Ok(()) => {
            if !json {
                output::success(&format!("Ledger initialized ({})", sentinel_key));
            }
            Ok(())
        }
        Err(e) => Err(invocation_failed("init", &e)),
    }
}
