//! Configuration management
//!
//! Settings live in `settings.json` inside the chaincode directory:
//! ```json
//! {
//!   "chaincode": { "accountPrefix": "acct:", "sentinelKey": "hello_world" },
//!   "stateFile": "world_state.duckdb",
//!   "logFilter": "info"
//! }
//! ```
//! Fields this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::account::{
    DEFAULT_ACCOUNT_PREFIX, DEFAULT_ACCOUNT_SUFFIX, DEFAULT_INITIAL_CASH_BALANCE,
};
use crate::domain::RegistrarConfig;
use crate::services::state::DEFAULT_SENTINEL_KEY;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_STATE_FILE: &str = "world_state.duckdb";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    chaincode: ChaincodeSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_filter: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChaincodeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial_cash_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sentinel_key: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Chaincode configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub account_prefix: String,
    pub account_suffix: String,
    pub initial_cash_balance: f64,
    pub sentinel_key: String,
    pub state_file: String,
    pub log_filter: Option<String>,
    // Prefix taken from CHAINCODE_ACCOUNT_PREFIX; never written back
    env_account_prefix: Option<String>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default())
    }
}

impl Config {
    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            account_prefix: raw
                .chaincode
                .account_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCOUNT_PREFIX.to_string()),
            account_suffix: raw
                .chaincode
                .account_suffix
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCOUNT_SUFFIX.to_string()),
            initial_cash_balance: raw
                .chaincode
                .initial_cash_balance
                .unwrap_or(DEFAULT_INITIAL_CASH_BALANCE),
            sentinel_key: raw
                .chaincode
                .sentinel_key
                .clone()
                .unwrap_or_else(|| DEFAULT_SENTINEL_KEY.to_string()),
            state_file: raw
                .state_file
                .clone()
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
            log_filter: raw.log_filter.clone(),
            env_account_prefix: None,
            _raw_settings: raw,
        }
    }

    /// Load config from the chaincode directory
    ///
    /// `CHAINCODE_ACCOUNT_PREFIX` overrides the account namespace (for
    /// running several ledgers side by side in CI).
    pub fn load(chaincode_dir: &Path) -> Result<Self> {
        let settings_path = chaincode_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings in {:?}", settings_path))?
        } else {
            SettingsFile::default()
        };

        let mut config = Self::from_settings(raw);
        if let Ok(prefix) = std::env::var("CHAINCODE_ACCOUNT_PREFIX") {
            if !prefix.is_empty() {
                config.account_prefix = prefix.clone();
                config.env_account_prefix = Some(prefix);
            }
        }
        Ok(config)
    }

    /// Save config to the chaincode directory, keeping unmanaged fields
    pub fn save(&self, chaincode_dir: &Path) -> Result<()> {
        let settings_path = chaincode_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        if self.env_account_prefix.as_deref() != Some(self.account_prefix.as_str()) {
            settings.chaincode.account_prefix = Some(self.account_prefix.clone());
        }
        settings.chaincode.account_suffix = Some(self.account_suffix.clone());
        settings.chaincode.initial_cash_balance = Some(self.initial_cash_balance);
        settings.chaincode.sentinel_key = Some(self.sentinel_key.clone());
        settings.state_file = Some(self.state_file.clone());
        settings.log_filter = self.log_filter.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Settings handed to the account registrar
    pub fn registrar(&self) -> RegistrarConfig {
        RegistrarConfig {
            account_prefix: self.account_prefix.clone(),
            account_suffix: self.account_suffix.clone(),
            initial_cash_balance: self.initial_cash_balance,
        }
    }
}
