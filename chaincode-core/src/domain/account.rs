//! Account domain model

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Namespace prefix for account records in world state
pub const DEFAULT_ACCOUNT_PREFIX: &str = "acct:";

/// Suffix appended to the account id to form its display prefix
pub const DEFAULT_ACCOUNT_SUFFIX: &str = "000A";

/// Cash balance every account starts with
pub const DEFAULT_INITIAL_CASH_BALANCE: f64 = 10_000_000.0;

/// Settings the account registrar is constructed with
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrarConfig {
    /// Key namespace for account records (`acct:` + id)
    pub account_prefix: String,
    pub account_suffix: String,
    pub initial_cash_balance: f64,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
            account_suffix: DEFAULT_ACCOUNT_SUFFIX.to_string(),
            initial_cash_balance: DEFAULT_INITIAL_CASH_BALANCE,
        }
    }
}

impl RegistrarConfig {
    /// World-state key holding the account for `id`
    pub fn account_key(&self, id: &str) -> String {
        format!("{}{}", self.account_prefix, id)
    }
}

/// A ledger-resident account record
///
/// The JSON layout (`id`, `prefix`, `cashBalance`, `assetIds`) is shared with
/// every other reader of the ledger and must not change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub id: String,
    pub prefix: String,
    #[serde(serialize_with = "serialize_balance")]
    pub cash_balance: f64,
    /// Older records carry `null` here
    #[serde(deserialize_with = "deserialize_asset_ids")]
    pub asset_ids: Vec<String>,
}

impl Account {
    /// Build a fresh account for `id` using the registrar settings
    pub fn new(id: impl Into<String>, config: &RegistrarConfig) -> Self {
        let id = id.into();
        Self {
            prefix: format!("{}{}", id, config.account_suffix),
            id,
            cash_balance: config.initial_cash_balance,
            asset_ids: Vec::new(),
        }
    }

    /// Encode to the canonical JSON bytes stored in world state
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode a record read from world state
    ///
    /// A record must be a JSON object. A bare `null` decodes to an empty
    /// account, which is how such records have always been read on this
    /// ledger. Any other JSON value is a data error.
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        match serde_json::from_slice::<Value>(bytes)? {
            value @ Value::Object(_) => serde_json::from_value(value),
            Value::Null => Ok(Self::default()),
            other => Err(<serde_json::Error as de::Error>::invalid_type(
                unexpected(&other),
                &"an account object",
            )),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Null | Value::Object(_) => Unexpected::Other("value"),
    }
}

/// Whole-number balances are written as JSON integers (`10000000`), the form
/// already present in ledger data.
fn serialize_balance<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn deserialize_asset_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
