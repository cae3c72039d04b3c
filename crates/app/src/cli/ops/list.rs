use clap::Args;

use common::exchange::ExchangeError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Records requested per ledger call
    #[arg(long, default_value_t = 2000)]
    pub page_size: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("list failed at {0}")]
    Exchange(#[from] ExchangeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let exchange = ctx.ledger_exchange()?;
        let records = exchange.list_records(self.page_size).await?;

        if records.is_empty() {
            return Ok("No records found".to_string());
        }
        let output = records
            .iter()
            .map(|record| {
                format!(
                    "{} {} [{}] {}",
                    record.uuid, record.timestamp, record.sender_identity, record.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(output)
    }
}
