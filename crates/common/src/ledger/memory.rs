use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::provider::{Ledger, LedgerError, LedgerFunctions};
use crate::record::ArtifactRecord;

/// In-memory ledger behaving like the record chaincode:
///  records are validated on creation, immutable once written,
///  and listed in key order with bookmark pagination
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    inner: Arc<RwLock<BTreeMap<String, ArtifactRecord>>>,
    functions: LedgerFunctions,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::with_functions(LedgerFunctions::default())
    }

    /// Answer to custom function names
    pub fn with_functions(functions: LedgerFunctions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
            functions,
        }
    }

    /// Number of records on the ledger
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn create(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let [record_json] = args else {
            return Err(arity(function, 1, args.len()));
        };
        let record: ArtifactRecord = serde_json::from_str(record_json)
            .map_err(|e| failed(function, format!("failed to unmarshal record: {}", e)))?;
        record
            .validate()
            .map_err(|e| failed(function, e.to_string()))?;

        let mut inner = self.inner.write().map_err(|e| {
            LedgerError::Transport(format!("failed to acquire write lock: {}", e))
        })?;
        let key = record.uuid.to_string();
        if inner.contains_key(&key) {
            return Err(failed(
                function,
                format!("record with UUID {} already exists", key),
            ));
        }
        inner.insert(key, record);
        Ok(Value::Null)
    }

    fn read(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let [uuid] = args else {
            return Err(arity(function, 1, args.len()));
        };
        let inner = self.inner.read().map_err(|e| {
            LedgerError::Transport(format!("failed to acquire read lock: {}", e))
        })?;
        let record = inner
            .get(uuid)
            .ok_or_else(|| failed(function, format!("record with UUID {} does not exist", uuid)))?;
        serde_json::to_value(record).map_err(|e| LedgerError::Malformed {
            function: function.to_string(),
            reason: e.to_string(),
        })
    }

    fn list(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let [page_size, bookmark] = args else {
            return Err(arity(function, 2, args.len()));
        };
        let page_size: usize = page_size
            .parse()
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| failed(function, format!("invalid page size {:?}", page_size)))?;

        let inner = self.inner.read().map_err(|e| {
            LedgerError::Transport(format!("failed to acquire read lock: {}", e))
        })?;
        let start = if bookmark.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(bookmark.clone())
        };

        let mut remaining = inner.range((start, Bound::Unbounded));
        let page: Vec<(&String, &ArtifactRecord)> = remaining.by_ref().take(page_size).collect();
        let next_bookmark = match (remaining.next(), page.last()) {
            (Some(_), Some((key, _))) => (*key).clone(),
            _ => String::new(),
        };
        let records: Vec<&ArtifactRecord> = page.into_iter().map(|(_, record)| record).collect();

        Ok(json!({
            "metadataList": records,
            "bookmark": next_bookmark,
        }))
    }

    fn delete(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let [uuid] = args else {
            return Err(arity(function, 1, args.len()));
        };
        let mut inner = self.inner.write().map_err(|e| {
            LedgerError::Transport(format!("failed to acquire write lock: {}", e))
        })?;
        inner
            .remove(uuid)
            .ok_or_else(|| failed(function, format!("record with UUID {} does not exist", uuid)))?;
        Ok(Value::Null)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(function: &str, message: String) -> LedgerError {
    LedgerError::Invocation {
        function: function.to_string(),
        message,
    }
}

fn arity(function: &str, expected: usize, got: usize) -> LedgerError {
    failed(
        function,
        format!("expected {} argument(s), got {}", expected, got),
    )
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn invoke(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        if function == self.functions.create {
            self.create(function, args)
        } else if function == self.functions.read {
            self.read(function, args)
        } else if function == self.functions.list {
            self.list(function, args)
        } else if function == self.functions.delete {
            self.delete(function, args)
        } else {
            Err(failed(function, format!("function {} not found", function)))
        }
    }
}
