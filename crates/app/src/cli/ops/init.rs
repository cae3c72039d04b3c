use std::path::PathBuf;

use clap::Args;
use url::Url;

use cti_exchange::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Vault address
    #[arg(long)]
    pub vault_addr: Option<Url>,

    /// IPFS cluster add endpoint
    #[arg(long)]
    pub ipfs_add_url: Option<Url>,

    /// IPFS gateway base URL
    #[arg(long)]
    pub ipfs_gateway_url: Option<Url>,

    /// Chaincode name
    #[arg(long)]
    pub chaincode: Option<String>,

    /// Channel the chaincode is deployed on
    #[arg(long)]
    pub channel: Option<String>,

    /// Deadline in seconds for each network call
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Init {
    fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        if let Some(addr) = &self.vault_addr {
            config.vault.addr = addr.clone();
        }
        if let Some(url) = &self.ipfs_add_url {
            config.ipfs.add_url = url.clone();
        }
        if let Some(url) = &self.ipfs_gateway_url {
            config.ipfs.gateway_url = url.clone();
        }
        if let Some(chaincode) = &self.chaincode {
            config.fabric.chaincode = chaincode.clone();
        }
        if let Some(channel) = &self.channel {
            config.fabric.channel = channel.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        config.log_dir = self.log_dir.clone();
        config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::init(ctx.config_path.clone(), Some(self.config()))?;
        let config = &state.config;

        let output = format!(
            "Initialized cti directory at: {}\n\
             - Config: {}\n\
             - Vault: {} (mount {})\n\
             - IPFS add: {}\n\
             - IPFS gateway: {}\n\
             - Chaincode: {} on channel {}\n\
             - Timeout: {}s",
            state.cti_dir.display(),
            state.config_path.display(),
            config.vault.addr,
            config.vault.mount,
            config.ipfs.add_url,
            config.ipfs.gateway_url,
            config.fabric.chaincode,
            config.fabric.channel,
            config.timeout_secs,
        );

        Ok(output)
    }
}
