use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::provider::{Ledger, LedgerError, LedgerFunctions};
use crate::deadline::bounded;
use crate::record::ArtifactRecord;

/// One page of a record listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    pub records: Vec<ArtifactRecord>,
    /// Entries on the page that are not well-formed records
    pub skipped: usize,
    /// Empty on the last page
    pub bookmark: String,
}

#[derive(Deserialize)]
struct PageResponse {
    #[serde(rename = "metadataList", default)]
    metadata_list: Option<Vec<Value>>,
    #[serde(default)]
    bookmark: Option<String>,
}

/// Typed access to artifact records over a raw [`Ledger`]
///
/// Every call runs under the configured deadline.
#[derive(Debug, Clone)]
pub struct RecordLedger<L> {
    ledger: L,
    functions: LedgerFunctions,
    timeout: Duration,
}

impl<L: Ledger> RecordLedger<L> {
    pub fn new(ledger: L, functions: LedgerFunctions, timeout: Duration) -> Self {
        Self {
            ledger,
            functions,
            timeout,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn functions(&self) -> &LedgerFunctions {
        &self.functions
    }

    async fn call(&self, function: &str, args: Vec<String>) -> Result<Value, LedgerError> {
        tracing::debug!(function, args = args.len(), "invoking ledger function");
        bounded(self.timeout, self.ledger.invoke(function, &args)).await
    }

    /// Anchor a new record
    pub async fn create(&self, record: &ArtifactRecord) -> Result<(), LedgerError> {
        let function = &self.functions.create;
        let json = serde_json::to_string(record).map_err(|e| malformed(function, e))?;
        self.call(function, vec![json]).await?;
        Ok(())
    }

    /// Read the record with the given UUID
    pub async fn read(&self, uuid: Uuid) -> Result<ArtifactRecord, LedgerError> {
        let function = &self.functions.read;
        let value = self.call(function, vec![uuid.to_string()]).await?;
        let record: ArtifactRecord =
            serde_json::from_value(value).map_err(|e| malformed(function, e))?;
        if record.uuid != uuid {
            return Err(malformed(
                function,
                format!("asked for record {}, got {}", uuid, record.uuid),
            ));
        }
        Ok(record)
    }

    /// Fetch one page of records, starting after `bookmark`
    pub async fn list_page(
        &self,
        page_size: u32,
        bookmark: &str,
    ) -> Result<RecordPage, LedgerError> {
        let function = &self.functions.list;
        let value = self
            .call(function, vec![page_size.to_string(), bookmark.to_string()])
            .await?;
        let page: PageResponse = serde_json::from_value(value).map_err(|e| malformed(function, e))?;

        // Entries seeded or written by other clients may not follow the record schema
        let mut records = Vec::new();
        let mut skipped = 0;
        for entry in page.metadata_list.unwrap_or_default() {
            match serde_json::from_value::<ArtifactRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(function = %function, error = %e, "skipping malformed ledger entry");
                }
            }
        }
        Ok(RecordPage {
            records,
            skipped,
            bookmark: page.bookmark.unwrap_or_default(),
        })
    }

    /// Walk every page until the ledger hands back an empty bookmark
    ///
    /// # Errors
    ///
    /// Fails with `Malformed` if the ledger returns the same bookmark
    ///  twice in a row instead of advancing.
    pub async fn list_all(&self, page_size: u32) -> Result<Vec<ArtifactRecord>, LedgerError> {
        let mut records = Vec::new();
        let mut bookmark = String::new();
        loop {
            let page = self.list_page(page_size, &bookmark).await?;
            records.extend(page.records);
            if page.bookmark.is_empty() {
                break;
            }
            if page.bookmark == bookmark {
                return Err(malformed(
                    &self.functions.list,
                    format!("bookmark {:?} did not advance", bookmark),
                ));
            }
            bookmark = page.bookmark;
        }
        Ok(records)
    }

    /// Remove the record with the given UUID
    pub async fn delete(&self, uuid: Uuid) -> Result<(), LedgerError> {
        self.call(&self.functions.delete, vec![uuid.to_string()])
            .await?;
        Ok(())
    }
}

fn malformed(function: &str, reason: impl ToString) -> LedgerError {
    LedgerError::Malformed {
        function: function.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::content_store::ContentId;
    use crate::crypto::digest_bytes;
    use crate::keys::KeyPointer;
    use crate::ledger::MemoryLedger;
    use crate::source::{FixedClock, SeededRandom};
    use async_trait::async_trait;
    use serde_json::json;

    fn record(random: &SeededRandom) -> ArtifactRecord {
        ArtifactRecord::build(
            "phishing indicator",
            "org1",
            ContentId::from("bafkreiexample"),
            KeyPointer::new("kv-v2/data/org1_alert_0a1b2c3d4e5f"),
            digest_bytes(b"alert"),
            random,
            &FixedClock(chrono::Utc::now()),
        )
        .unwrap()
    }

    fn records<L: Ledger>(ledger: L) -> RecordLedger<L> {
        RecordLedger::new(ledger, LedgerFunctions::default(), Duration::from_secs(10))
    }

    /// Answers every call with the same canned value
    #[derive(Debug)]
    struct CannedLedger(Value);

    #[async_trait]
    impl Ledger for CannedLedger {
        async fn invoke(&self, _function: &str, _args: &[String]) -> Result<Value, LedgerError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct StalledLedger;

    #[async_trait]
    impl Ledger for StalledLedger {
        async fn invoke(&self, _function: &str, _args: &[String]) -> Result<Value, LedgerError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let ledger = records(MemoryLedger::new());
        let record = record(&SeededRandom::new(1));

        ledger.create(&record).await.unwrap();
        assert_eq!(ledger.read(record.uuid).await.unwrap(), record);
        assert!(matches!(
            ledger.create(&record).await,
            Err(LedgerError::Invocation { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_all_walks_every_page() {
        let ledger = records(MemoryLedger::new());
        let random = SeededRandom::new(2);
        let mut created = Vec::new();
        for _ in 0..7 {
            let record = record(&random);
            ledger.create(&record).await.unwrap();
            created.push(record.uuid);
        }

        let first = ledger.list_page(3, "").await.unwrap();
        assert_eq!(first.records.len(), 3);
        assert!(!first.bookmark.is_empty());

        let mut listed: Vec<Uuid> = ledger
            .list_all(3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.uuid)
            .collect();
        listed.sort();
        created.sort();
        assert_eq!(listed, created);
    }

    #[tokio::test]
    async fn test_empty_listing_accepts_null_metadata() {
        let ledger = records(CannedLedger(json!({"metadataList": null, "bookmark": ""})));
        assert!(ledger.list_all(2000).await.unwrap().is_empty());

        let ledger = records(CannedLedger(json!({})));
        assert_eq!(
            ledger.list_page(10, "").await.unwrap(),
            RecordPage {
                records: vec![],
                skipped: 0,
                bookmark: String::new()
            }
        );
    }

    #[tokio::test]
    async fn test_listing_skips_entries_that_are_not_records() {
        let stored = record(&SeededRandom::new(5));
        let seed_entry = json!({
            "UUID": "12345",
            "Description": "Initial CTI Metadata",
            "Timestamp": "2023-10-01T12:00:00Z",
            "SenderIdentity": "HeadOfOperations",
            "CID": "QmTzQ1N1z5Q5Z5Q5Z5Q5Z5Q5Z5Q5Z5Q5Z5Q5Z5Q5Z5Q5",
            "VaultKey": "kv-v2/data/HeadOfOperations",
            "SHA256Hash": "sha256hash12345",
            "AccessList": ["HeadOfOperations", "IntelligenceUnit"]
        });
        let ledger = records(CannedLedger(json!({
            "metadataList": [serde_json::to_value(&stored).unwrap(), seed_entry],
            "bookmark": ""
        })));

        let page = ledger.list_page(10, "").await.unwrap();
        assert_eq!(page.records, vec![stored.clone()]);
        assert_eq!(page.skipped, 1);
        assert_eq!(ledger.list_all(10).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_list_all_stops_on_stuck_bookmark() {
        let ledger = records(CannedLedger(json!({"metadataList": [], "bookmark": "again"})));
        assert!(matches!(
            ledger.list_all(10).await,
            Err(LedgerError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_rejects_mismatched_record() {
        let stored = record(&SeededRandom::new(3));
        let ledger = records(CannedLedger(serde_json::to_value(&stored).unwrap()));

        assert_eq!(ledger.read(stored.uuid).await.unwrap(), stored);
        assert!(matches!(
            ledger.read(Uuid::new_v4()).await,
            Err(LedgerError::Malformed { .. })
        ));

        let ledger = records(CannedLedger(json!("not a record")));
        assert!(matches!(
            ledger.read(stored.uuid).await,
            Err(LedgerError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let ledger = records(MemoryLedger::new());
        let record = record(&SeededRandom::new(4));
        ledger.create(&record).await.unwrap();

        ledger.delete(record.uuid).await.unwrap();
        assert!(ledger.ledger().is_empty());
        assert!(ledger.delete(record.uuid).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_bounded() {
        let ledger = RecordLedger::new(
            StalledLedger,
            LedgerFunctions::default(),
            Duration::from_millis(250),
        );
        assert_eq!(
            ledger.read(Uuid::new_v4()).await,
            Err(LedgerError::Timeout(Duration::from_millis(250)))
        );
    }
}
