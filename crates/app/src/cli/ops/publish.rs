use std::path::PathBuf;

use clap::Args;

use common::exchange::ExchangeError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
#[command(visible_alias = "create")]
pub struct Publish {
    /// Path to the artifact
    pub filepath: PathBuf,

    /// Publishing organization
    pub sender_identity: String,

    /// What the artifact is
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("publish failed at {0}")]
    Exchange(#[from] ExchangeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Publish {
    type Error = PublishError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let exchange = ctx.creator_exchange()?;
        let published = exchange
            .publish_file(&self.filepath, &self.sender_identity, &self.description)
            .await?;
        let record = &published.record;

        Ok(format!(
            "CTI UUID: {}\n\
             - CID: {}\n\
             - Key: {}\n\
             - SHA-256: {}",
            published.uuid, record.content_id, record.key_pointer, record.digest
        ))
    }
}
