use clap::Args;
use uuid::Uuid;

use common::exchange::ExchangeError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// UUID of the record to remove from the ledger
    pub uuid: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("delete failed at {0}")]
    Exchange(#[from] ExchangeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Delete {
    type Error = DeleteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let exchange = ctx.ledger_exchange()?;
        exchange.delete_record(self.uuid).await?;
        Ok(format!(
            "Deleted record {} (the sealed blob and its key are left in place)",
            self.uuid
        ))
    }
}
