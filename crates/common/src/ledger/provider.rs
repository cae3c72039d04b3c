use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::deadline::TimedOut;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The invocation ran and reported failure
    #[error("ledger function {function} failed: {message}")]
    Invocation { function: String, message: String },
    /// The invocation succeeded but its response could not be understood
    #[error("malformed response from {function}: {reason}")]
    Malformed { function: String, reason: String },
    #[error("ledger unreachable: {0}")]
    Transport(String),
    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),
}

impl TimedOut for LedgerError {
    fn timed_out(after: Duration) -> Self {
        LedgerError::Timeout(after)
    }
}

/// Remote procedure call into the shared ledger
///
/// How the call is transported (a CLI subprocess, a gateway
///  client, an in-memory map) is up to the implementation.
#[async_trait]
pub trait Ledger: Send + Sync + Debug + 'static {
    /// Invoke `function` with positional string arguments
    ///
    /// # Returns
    /// * `Ok(Value)` - The function's JSON response, `Null` if it returned nothing
    /// * `Err(LedgerError)` - The invocation failed or its response was malformed
    async fn invoke(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<serde_json::Value, LedgerError>;
}

/// Names of the ledger functions the exchange calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFunctions {
    /// Takes one argument, the record JSON
    #[serde(default = "default_create")]
    pub create: String,
    /// Takes one argument, the record UUID
    #[serde(default = "default_read")]
    pub read: String,
    /// Takes a page size and a bookmark, returns `{ metadataList, bookmark }`
    #[serde(default = "default_list")]
    pub list: String,
    /// Takes one argument, the record UUID
    #[serde(default = "default_delete")]
    pub delete: String,
}

fn default_create() -> String {
    "CreateRecord".to_string()
}

fn default_read() -> String {
    "ReadRecord".to_string()
}

fn default_list() -> String {
    "ListRecords".to_string()
}

fn default_delete() -> String {
    "DeleteRecord".to_string()
}

impl Default for LedgerFunctions {
    fn default() -> Self {
        Self {
            create: default_create(),
            read: default_read(),
            list: default_list(),
            delete: default_delete(),
        }
    }
}
