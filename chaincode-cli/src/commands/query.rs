//! Query command - run a read-only chaincode function

use anyhow::Result;
use chaincode_core::{EntryPoint, OperationResult};

use super::{get_context, get_logger, invocation_failed, log_outcome};
use crate::output::{self, PayloadFormat};

pub fn run(function: &str, args: Vec<String>, format: PayloadFormat, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let result = ctx.dispatcher.query(function, &args);
    log_outcome(&logger, EntryPoint::Query, function, args.len(), &result);

    match result {
        Ok(payload) => {
            let rendered = payload
                .as_deref()
                .map(|bytes| output::render_payload(bytes, format))
                .unwrap_or_default();
            if json {
                let out = OperationResult::ok(rendered);
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", rendered);
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let out: OperationResult<String> = OperationResult::fail(e.to_string());
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Err(invocation_failed(function, &e))
        }
    }
}
