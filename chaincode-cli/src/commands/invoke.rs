//! Invoke command - run a state-changing chaincode function

use std::collections::HashMap;

use anyhow::Result;
use chaincode_core::{EntryPoint, OperationResult};

use super::{get_context, get_logger, invocation_failed, log_outcome};
use crate::output;

pub fn run(function: &str, args: Vec<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let result = ctx.dispatcher.invoke(function, &args);
    log_outcome(&logger, EntryPoint::Invoke, function, args.len(), &result);

    let mut context = HashMap::new();
    context.insert("function".to_string(), serde_json::json!(function));
    context.insert("argCount".to_string(), serde_json::json!(args.len()));

    match result {
        Ok(payload) => {
            let text = payload.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
            if json {
                let out = OperationResult::ok_with_context(text, context);
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                match text {
                    Some(text) => println!("{}", text),
                    None => output::success(&format!("{} succeeded", function)),
                }
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let out: OperationResult<String> = OperationResult::fail_with_context(e.to_string(), context);
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Err(invocation_failed(function, &e))
        }
    }
}
