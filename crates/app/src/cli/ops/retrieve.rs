use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use common::exchange::{ExchangeError, Integrity, Retrieved};

use crate::cli::op::ContextError;

/// Bytes of binary plaintext shown when no output file is given
const PREVIEW_BYTES: usize = 64;

#[derive(Args, Debug, Clone)]
#[command(visible_alias = "decrypt")]
pub struct Retrieve {
    /// UUID of the artifact record
    pub uuid: Uuid,

    /// Where to write the plaintext (printed if omitted)
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("retrieve failed at {0}")]
    Exchange(#[from] ExchangeError),
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn integrity_line(integrity: &Integrity) -> String {
    match integrity {
        Integrity::Verified => "Integrity: verified, the fingerprints match".to_string(),
        Integrity::Mismatch { expected, actual } => format!(
            "Integrity: MISMATCH, ledger has {} but the plaintext digests to {}",
            expected, actual
        ),
    }
}

/// Plaintext as text when it is UTF-8, otherwise a hex preview
fn render(plaintext: &[u8]) -> String {
    match std::str::from_utf8(plaintext) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let shown = &plaintext[..plaintext.len().min(PREVIEW_BYTES)];
            format!(
                "<{} bytes of binary data> {}{}",
                plaintext.len(),
                hex::encode(shown),
                if plaintext.len() > PREVIEW_BYTES { "..." } else { "" }
            )
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Retrieve {
    type Error = RetrieveError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let exchange = ctx.consumer_exchange()?;
        let Retrieved {
            record,
            plaintext,
            integrity,
        } = exchange.retrieve(self.uuid).await?;

        let mut lines = vec![
            format!(
                "{} from {} ({})",
                record.description, record.sender_identity, record.timestamp
            ),
            integrity_line(&integrity),
        ];
        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &plaintext)
                    .await
                    .map_err(|source| RetrieveError::Write {
                        path: path.clone(),
                        source,
                    })?;
                lines.push(format!("Decrypted data saved to {}", path.display()));
            }
            None => lines.push(render(&plaintext)),
        }
        Ok(lines.join("\n"))
    }
}
