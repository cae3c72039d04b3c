//! Ledger-anchored provenance records
//!
//! An [`ArtifactRecord`] is written once at publish time and never changes.
//! Its JSON field names are shared with the chaincode and other clients, so
//! they are fixed:
//!
//! ```json
//! {
//!   "UUID": "6f1c...",
//!   "Description": "phishing indicator",
//!   "Timestamp": "2024-05-01T12:30:00Z",
//!   "SenderIdentity": "org1",
//!   "CID": "bafkrei...",
//!   "VaultKey": "kv-v2/data/org1_alert_0a1b2c3d4e5f",
//!   "SHA256Hash": "ba7816bf..."
//! }
//! ```

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content_store::ContentId;
use crate::crypto::ContentDigest;
use crate::keys::KeyPointer;
use crate::source::{Clock, RandomError, RandomSource};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record field {0} must be non-empty")]
    EmptyField(&'static str),
}

/// Provenance and integrity metadata for one published artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    #[serde(rename = "UUID")]
    pub uuid: Uuid,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Timestamp", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "SenderIdentity")]
    pub sender_identity: String,
    #[serde(rename = "CID")]
    pub content_id: ContentId,
    #[serde(rename = "VaultKey")]
    pub key_pointer: KeyPointer,
    /// Digest of the plaintext, taken before encryption
    #[serde(rename = "SHA256Hash")]
    pub digest: ContentDigest,
}

impl ArtifactRecord {
    /// Assemble a record for a freshly deposited artifact.
    ///  Pure: draws a v4 UUID from `random` and the time from `clock`,
    ///  truncated to whole seconds.
    pub fn build(
        description: &str,
        sender_identity: &str,
        content_id: ContentId,
        key_pointer: KeyPointer,
        digest: ContentDigest,
        random: &dyn RandomSource,
        clock: &dyn Clock,
    ) -> Result<Self, RandomError> {
        let mut bytes = [0u8; 16];
        random.fill(&mut bytes)?;

        Ok(Self {
            uuid: uuid::Builder::from_random_bytes(bytes).into_uuid(),
            description: description.to_string(),
            timestamp: clock.now().trunc_subsecs(0),
            sender_identity: sender_identity.to_string(),
            content_id,
            key_pointer,
            digest,
        })
    }

    /// Check every field the ledger requires is present
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.uuid.is_nil() {
            return Err(RecordError::EmptyField("UUID"));
        }
        if self.description.trim().is_empty() {
            return Err(RecordError::EmptyField("Description"));
        }
        if self.sender_identity.trim().is_empty() {
            return Err(RecordError::EmptyField("SenderIdentity"));
        }
        if self.content_id.is_empty() {
            return Err(RecordError::EmptyField("CID"));
        }
        if self.key_pointer.is_empty() {
            return Err(RecordError::EmptyField("VaultKey"));
        }
        Ok(())
    }
}

/// ISO-8601 timestamps at second precision.
///  Written as UTC with a `Z` suffix; timezone-less values written by
///  older clients are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&s) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {:?}: {}", s, e)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::digest_bytes;
    use crate::source::{FixedClock, SeededRandom};
    use chrono::TimeZone;

    fn sample(random: &SeededRandom, clock: &FixedClock) -> ArtifactRecord {
        ArtifactRecord::build(
            "phishing indicator",
            "org1",
            ContentId::from("bafkreiexample"),
            KeyPointer::new("kv-v2/data/org1_alert_0a1b2c3d4e5f"),
            digest_bytes(b"alert"),
            random,
            clock,
        )
        .unwrap()
    }

    fn clock() -> FixedClock {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
            + chrono::Duration::milliseconds(789);
        FixedClock(at)
    }

    #[test]
    fn test_build_truncates_subseconds() {
        let record = sample(&SeededRandom::new(1), &clock());
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_build_generates_v4_uuids() {
        let random = SeededRandom::new(1);
        let a = sample(&random, &clock());
        let b = sample(&random, &clock());

        assert_eq!(a.uuid.get_version_num(), 4);
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(a.uuid, sample(&SeededRandom::new(1), &clock()).uuid);
    }

    #[test]
    fn test_json_shape() {
        let record = sample(&SeededRandom::new(1), &clock());
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "CID",
                "Description",
                "SHA256Hash",
                "SenderIdentity",
                "Timestamp",
                "UUID",
                "VaultKey"
            ]
        );
        assert_eq!(object["Timestamp"], "2024-05-01T12:30:00Z");
        assert_eq!(object["SHA256Hash"], digest_bytes(b"alert").to_hex());
        assert_eq!(object["VaultKey"], "kv-v2/data/org1_alert_0a1b2c3d4e5f");
        assert_eq!(object["UUID"], record.uuid.to_string());

        let parsed: ArtifactRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_parses_timezone_less_timestamps_and_ignores_extra_fields() {
        let json = serde_json::json!({
            "UUID": "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b",
            "Description": "legacy entry",
            "Timestamp": "2023-10-01T12:00:00",
            "SenderIdentity": "HeadOfOperations",
            "CID": "bafkreiexample",
            "VaultKey": "kv-v2/data/HeadOfOperations_report_abcdef",
            "SHA256Hash": digest_bytes(b"legacy").to_hex(),
            "AccessList": ["HeadOfOperations", "IntelligenceUnit"]
        });

        let record: ArtifactRecord = serde_json::from_value(json).unwrap();
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2023, 10, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_missing_fields_and_bad_digests() {
        let json = serde_json::json!({
            "UUID": "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b",
            "Description": "no digest",
            "Timestamp": "2023-10-01T12:00:00Z",
            "SenderIdentity": "org1",
            "CID": "bafkreiexample",
            "VaultKey": "kv-v2/data/x"
        });
        assert!(serde_json::from_value::<ArtifactRecord>(json.clone()).is_err());

        let mut bad = json;
        bad["SHA256Hash"] = "sha256hash12345".into();
        assert!(serde_json::from_value::<ArtifactRecord>(bad).is_err());
    }

    #[test]
    fn test_validate() {
        let record = sample(&SeededRandom::new(1), &clock());
        assert_eq!(record.validate(), Ok(()));

        let mut blank = record.clone();
        blank.description = "  ".to_string();
        assert_eq!(blank.validate(), Err(RecordError::EmptyField("Description")));

        let mut blank = record.clone();
        blank.content_id = ContentId::from("");
        assert_eq!(blank.validate(), Err(RecordError::EmptyField("CID")));

        let mut blank = record;
        blank.key_pointer = KeyPointer::new("");
        assert_eq!(blank.validate(), Err(RecordError::EmptyField("VaultKey")));
    }
}
