//! Integration tests for chaincode-core
//!
//! These run the dispatcher against a real DuckDB world state in a temp
//! directory, the same way the local peer harness does.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use chaincode_core::adapters::duckdb::DuckDbStateStore;
use chaincode_core::config::{Config, SETTINGS_FILE};
use chaincode_core::ports::StateStore;
use chaincode_core::{Account, ChaincodeContext, Error};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_context(temp_dir: &TempDir) -> ChaincodeContext {
    ChaincodeContext::new(temp_dir.path()).expect("Failed to create chaincode context")
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Account creation
// ============================================================================

#[test]
fn test_create_account_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    let payload = ctx.dispatcher.invoke("createAccount", &args(&["bob"])).unwrap();
    assert!(payload.is_none());

    let stored = ctx.store.get_state("acct:bob").unwrap();
    assert_eq!(
        String::from_utf8(stored.clone()).unwrap(),
        r#"{"id":"bob","prefix":"bob000A","cashBalance":10000000,"assetIds":[]}"#
    );

    let second = ctx.dispatcher.invoke("createAccount", &args(&["bob"]));
    assert_eq!(second, Err(Error::AlreadyExists("bob".to_string())));
    assert_eq!(ctx.store.get_state("acct:bob").unwrap(), stored);
}

#[test]
fn test_account_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = create_context(&temp_dir);
        ctx.dispatcher.invoke("createAccount", &args(&["alice"])).unwrap();
    }

    let ctx = create_context(&temp_dir);
    assert!(matches!(
        ctx.dispatcher.invoke("createAccount", &args(&["alice"])),
        Err(Error::AlreadyExists(_))
    ));

    let bytes = ctx
        .dispatcher
        .query("read", &args(&["acct:alice"]))
        .unwrap()
        .unwrap();
    let account = Account::from_bytes(&bytes).unwrap();
    assert_eq!(account.prefix, "alice000A");
    assert_eq!(account.cash_balance, 10_000_000.0);
    assert!(account.asset_ids.is_empty());
}

#[test]
fn test_empty_record_written_by_generic_write_is_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    ctx.dispatcher.invoke("write", &args(&["acct:carol", ""])).unwrap();
    ctx.dispatcher.invoke("createAccount", &args(&["carol"])).unwrap();

    let account = Account::from_bytes(&ctx.store.get_state("acct:carol").unwrap()).unwrap();
    assert_eq!(account.id, "carol");
}

#[test]
fn test_corrupt_record_is_left_alone() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    for record in ["[1,2,3]", "[]", r#"["dave"]"#, "\"dave\""] {
        ctx.dispatcher
            .invoke("write", &args(&["acct:dave", record]))
            .unwrap();
        assert_eq!(
            ctx.dispatcher.invoke("createAccount", &args(&["dave"])),
            Err(Error::CorruptExistingRecord("dave".to_string()))
        );
        assert_eq!(ctx.store.get_state("acct:dave").unwrap(), record.as_bytes().to_vec());
    }
}

#[test]
fn test_arity_errors_do_not_touch_state() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    assert!(matches!(
        ctx.dispatcher.invoke("createAccount", &[]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        ctx.dispatcher.invoke("createAccount", &args(&["erin", "extra"])),
        Err(Error::InvalidArgument(_))
    ));
    for bad in [args(&[]), args(&["k"]), args(&["k", "v", "extra"])] {
        assert!(matches!(
            ctx.dispatcher.invoke("write", &bad),
            Err(Error::InvalidArgument(_))
        ));
    }
    assert_eq!(ctx.store.key_count().unwrap(), 0);
}

#[test]
fn test_distinct_accounts_from_many_threads() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Arc::new(create_context(&temp_dir));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                ctx.dispatcher
                    .invoke("createAccount", &[format!("user{}", i)])
                    .map(|_| ())
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let status = ctx.status_service.get_status().unwrap();
    assert_eq!(status.total_accounts, 8);
}

// ============================================================================
// Generic read/write and init
// ============================================================================

#[test]
fn test_init_write_read() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    ctx.dispatcher.init(&args(&["hello"])).unwrap();
    ctx.dispatcher.invoke("write", &args(&["color", "blue"])).unwrap();

    assert_eq!(
        ctx.dispatcher.query("read", &args(&["hello_world"])).unwrap(),
        Some(b"hello".to_vec())
    );
    assert_eq!(
        ctx.dispatcher.query("read", &args(&["color"])).unwrap(),
        Some(b"blue".to_vec())
    );
    assert_eq!(
        ctx.dispatcher.query("read", &args(&["missing"])),
        Err(Error::KeyReadFailed("missing".to_string()))
    );
}

#[test]
fn test_query_refuses_writes() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    assert_eq!(
        ctx.dispatcher.query("createAccount", &args(&["frank"])),
        Err(Error::QueryNotPermitted("createAccount".to_string()))
    );
    assert!(ctx.store.get_state("acct:frank").is_err());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_settings_change_namespace_and_sentinel() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(SETTINGS_FILE),
        r#"{"chaincode": {"accountPrefix": "user:", "sentinelKey": "genesis"}, "stateFile": "peer0.duckdb"}"#,
    )
    .unwrap();

    let ctx = create_context(&temp_dir);
    ctx.dispatcher.init(&args(&["v1"])).unwrap();
    ctx.dispatcher.invoke("createAccount", &args(&["grace"])).unwrap();

    assert!(temp_dir.path().join("peer0.duckdb").exists());
    assert_eq!(ctx.store.get_state("genesis").unwrap(), b"v1".to_vec());
    assert!(ctx.store.get_state("user:grace").is_ok());

    let status = ctx.status_service.get_status().unwrap();
    assert_eq!(status.sentinel.as_deref(), Some("v1"));
    assert_eq!(status.accounts[0].key, "user:grace");
}

#[test]
fn test_context_over_in_memory_store() {
    let store = Arc::new(DuckDbStateStore::open_in_memory().unwrap());
    store.ensure_schema().unwrap();
    let ctx = ChaincodeContext::with_store(Config::default(), store);

    ctx.dispatcher.invoke("createAccount", &args(&["heidi"])).unwrap();
    assert!(ctx.store.db_path().is_none());
    assert_eq!(ctx.store.key_count().unwrap(), 1);
}
