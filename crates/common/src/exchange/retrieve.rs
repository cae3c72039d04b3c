use uuid::Uuid;

use super::{Exchange, ExchangeError, Integrity, Retrieved, Step};
use crate::content_store::ContentStore;
use crate::crypto::{digest_bytes, open_bytes};
use crate::deadline::bounded;
use crate::ledger::Ledger;
use crate::secret_store::SecretStore;

impl<S, C, L> Exchange<S, C, L>
where
    S: SecretStore,
    C: ContentStore,
    L: Ledger,
{
    /// Retrieve, open and verify the artifact recorded under `uuid`
    ///
    /// # Errors
    ///
    /// Fails with `AuthenticationFailure` if the blob does not open under
    ///  its key; no plaintext is returned then. A plaintext that opens but
    ///  does not match the anchored fingerprint is not an error: it comes
    ///  back with `Integrity::Mismatch`.
    pub async fn retrieve(&self, uuid: Uuid) -> Result<Retrieved, ExchangeError> {
        let record = self.read_record(uuid).await?;

        let blob = bounded(self.call_timeout, self.content.get(&record.content_id))
            .await
            .map_err(|source| ExchangeError::ContentUnavailable {
                step: Step::FetchContent,
                source,
            })?;
        tracing::debug!(cid = %record.content_id, size = blob.len(), "sealed blob fetched");

        let key_id = record
            .key_pointer
            .key_id()
            .map_err(|source| ExchangeError::KeyUnavailable {
                step: Step::FetchKey,
                source,
            })?;
        let key = self
            .keys
            .retrieve(&key_id)
            .await
            .map_err(|source| ExchangeError::KeyUnavailable {
                step: Step::FetchKey,
                source,
            })?;

        let plaintext =
            open_bytes(&key, &blob).map_err(|source| ExchangeError::AuthenticationFailure {
                step: Step::Open,
                source,
            })?;

        let actual = digest_bytes(&plaintext);
        let integrity = if actual == record.digest {
            Integrity::Verified
        } else {
            tracing::warn!(
                uuid = %uuid,
                expected = %record.digest,
                actual = %actual,
                "retrieved artifact does not match its ledger fingerprint"
            );
            Integrity::Mismatch {
                expected: record.digest,
                actual,
            }
        };

        tracing::info!(
            uuid = %uuid,
            cid = %record.content_id,
            key_id = %key_id,
            verified = integrity == Integrity::Verified,
            "artifact retrieved"
        );
        Ok(Retrieved {
            record,
            plaintext,
            integrity,
        })
    }
}
