pub use clap::Parser;

use std::path::PathBuf;

use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "cti")]
#[command(about = "Share encrypted threat-intelligence artifacts over Vault, IPFS and Fabric")]
pub struct Args {
    /// Path to the cti config directory (defaults to ~/.cti)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level written to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Vault token used to escrow keys when publishing
    #[arg(long, global = true, env = "CTI_CREATOR_TOKEN", hide_env_values = true)]
    pub creator_token: Option<String>,

    /// Vault token used to fetch keys when retrieving
    #[arg(long, global = true, env = "CTI_CONSUMER_TOKEN", hide_env_values = true)]
    pub consumer_token: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
