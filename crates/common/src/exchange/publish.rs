use std::path::Path;

use bytes::Bytes;

use super::{Exchange, ExchangeError, Published, Step};
use crate::content_store::ContentStore;
use crate::crypto::{digest_bytes, seal, EnvelopeKey};
use crate::deadline::bounded;
use crate::keys::KeyId;
use crate::ledger::Ledger;
use crate::record::ArtifactRecord;
use crate::secret_store::SecretStore;

impl<S, C, L> Exchange<S, C, L>
where
    S: SecretStore,
    C: ContentStore,
    L: Ledger,
{
    /// Publish the file at `path`
    ///
    /// The file is read once; the bytes fingerprinted are the bytes sealed.
    pub async fn publish_file(
        &self,
        path: impl AsRef<Path>,
        sender: &str,
        description: &str,
    ) -> Result<Published, ExchangeError> {
        let path = path.as_ref();
        let plaintext = tokio::fs::read(path)
            .await
            .map_err(|source| ExchangeError::Io {
                step: Step::ReadArtifact,
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        self.publish(name, &plaintext, sender, description).await
    }

    /// Publish an in-memory artifact named `artifact_name`
    ///
    /// # Steps
    /// 1. fingerprint the plaintext
    /// 2. seal it under a fresh key
    /// 3. escrow the key in the secret store
    /// 4. deposit the sealed blob in the content store
    /// 5. anchor the record on the ledger
    pub async fn publish(
        &self,
        artifact_name: &str,
        plaintext: &[u8],
        sender: &str,
        description: &str,
    ) -> Result<Published, ExchangeError> {
        let random = self.random.as_ref();

        let digest = digest_bytes(plaintext);
        let key = EnvelopeKey::generate(random).map_err(|source| ExchangeError::Random {
            step: Step::GenerateKey,
            source,
        })?;
        let blob = seal(&key, plaintext, random)
            .map_err(|source| ExchangeError::Encryption {
                step: Step::Seal,
                source,
            })?
            .to_bytes();
        tracing::debug!(
            artifact = artifact_name,
            size = plaintext.len(),
            digest = %digest,
            "artifact sealed"
        );

        let key_id =
            KeyId::for_artifact(sender, artifact_name, random).map_err(|source| {
                ExchangeError::Random {
                    step: Step::NameKey,
                    source,
                }
            })?;
        let key_pointer =
            self.keys
                .store(&key_id, &key)
                .await
                .map_err(|source| ExchangeError::KeyUnavailable {
                    step: Step::StoreKey,
                    source,
                })?;
        drop(key);

        let content_id = bounded(self.call_timeout, self.content.put(Bytes::from(blob)))
            .await
            .map_err(|source| ExchangeError::ContentUnavailable {
                step: Step::StoreContent,
                source,
            })?;
        tracing::debug!(cid = %content_id, "sealed blob deposited");

        let record = ArtifactRecord::build(
            description,
            sender,
            content_id,
            key_pointer,
            digest,
            random,
            self.clock.as_ref(),
        )
        .map_err(|source| ExchangeError::Random {
            step: Step::BuildRecord,
            source,
        })?;
        self.records
            .create(&record)
            .await
            .map_err(|source| ExchangeError::LedgerFailure {
                step: Step::AnchorRecord,
                source,
            })?;

        tracing::info!(
            uuid = %record.uuid,
            cid = %record.content_id,
            key_id = %key_id,
            sender,
            "artifact published"
        );
        Ok(Published {
            uuid: record.uuid,
            record,
        })
    }
}
