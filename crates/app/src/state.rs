use std::time::Duration;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use common::exchange::{Exchange, ExchangeConfig};
use common::keys::DEFAULT_MOUNT;
use common::ledger::LedgerFunctions;

use crate::adapters::{
    AdapterError, FabricLedger, FabricSettings, IpfsContentStore, VaultSecretStore,
};

pub const APP_NAME: &str = "cti";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Exchange over the deployed network collaborators
pub type NetworkExchange = Exchange<VaultSecretStore, IpfsContentStore, FabricLedger>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_addr")]
    pub addr: Url,
    /// KV v2 mount envelope keys are escrowed under
    #[serde(default = "default_mount")]
    pub mount: String,
}

fn default_vault_addr() -> Url {
    Url::parse("http://172.20.0.2:8200").expect("hardcoded URL must parse")
}

fn default_mount() -> String {
    DEFAULT_MOUNT.to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: default_vault_addr(),
            mount: default_mount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpfsConfig {
    /// Cluster endpoint blobs are uploaded to
    #[serde(default = "default_add_url")]
    pub add_url: Url,
    /// Gateway blobs are fetched from, as `{gateway_url}/{cid}`
    #[serde(default = "default_gateway_url")]
    pub gateway_url: Url,
}

fn default_add_url() -> Url {
    Url::parse("http://172.20.0.2:9094/add").expect("hardcoded URL must parse")
}

fn default_gateway_url() -> Url {
    Url::parse("http://172.20.0.2:8080/ipfs").expect("hardcoded URL must parse")
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            add_url: default_add_url(),
            gateway_url: default_gateway_url(),
        }
    }
}

/// Function names exposed by the deployed CTI chaincode
fn default_functions() -> LedgerFunctions {
    LedgerFunctions {
        create: "CreateCTIMetadata".to_string(),
        read: "ReadCTIMetadata".to_string(),
        list: "GetAllCTI".to_string(),
        delete: "DeleteCTIMetadata".to_string(),
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deadline for every secret store, content store and ledger call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory for daily rolling log files (optional)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub ipfs: IpfsConfig,
    #[serde(default)]
    pub fabric: FabricSettings,
    #[serde(default = "default_functions")]
    pub functions: LedgerFunctions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            log_dir: None,
            vault: VaultConfig::default(),
            ipfs: IpfsConfig::default(),
            fabric: FabricSettings::default(),
            functions: default_functions(),
        }
    }
}

impl AppConfig {
    pub fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig {
            mount: self.vault.mount.clone(),
            call_timeout: Duration::from_secs(self.timeout_secs),
            functions: self.functions.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the cti directory (~/.cti)
    pub cti_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the cti directory path (custom or default ~/.cti)
    pub fn cti_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new cti state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let cti_dir = Self::cti_dir(custom_path)?;

        if cti_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&cti_dir)?;

        let config = config.unwrap_or_default();
        let config_path = cti_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            cti_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the cti directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let cti_dir = Self::cti_dir(custom_path)?;

        if !cti_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = cti_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            cti_dir,
            config_path,
            config,
        })
    }

    /// Wire an exchange over the configured network, authenticating
    ///  to Vault with `vault_token`
    pub fn exchange(&self, vault_token: &str) -> Result<NetworkExchange, StateError> {
        let secrets = VaultSecretStore::new(&self.config.vault.addr, vault_token)?;
        let content = IpfsContentStore::new(&self.config.ipfs.add_url, &self.config.ipfs.gateway_url)?;
        let ledger = FabricLedger::new(self.config.fabric.clone());
        Ok(Exchange::new(
            secrets,
            content,
            ledger,
            self.config.exchange_config(),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cti directory not initialized. Run 'cti init' first")]
    NotInitialized,

    #[error("cti directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to set up network clients: {0}")]
    Adapter(#[from] AdapterError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cti_dir = dir.path().join("cti");

        let mut config = AppConfig::default();
        config.timeout_secs = 3;
        config.fabric.channel = "mychannel".to_string();
        let state = AppState::init(Some(cti_dir.clone()), Some(config.clone())).unwrap();
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(cti_dir.clone())).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(
            loaded.config.exchange_config().call_timeout,
            Duration::from_secs(3)
        );

        assert!(matches!(
            AppState::init(Some(cti_dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(dir.path().join("missing"))),
            Err(StateError::NotInitialized)
        ));
        assert!(matches!(
            AppState::load(Some(dir.path().to_path_buf())),
            Err(StateError::MissingFile(_))
        ));
    }

    #[test]
    fn test_partial_config_uses_deployment_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            timeout_secs = 30

            [vault]
            addr = "http://vault.internal:8200"
            "#,
        )
        .unwrap();

        assert_eq!(config.vault.addr.as_str(), "http://vault.internal:8200/");
        assert_eq!(config.vault.mount, "kv-v2");
        assert_eq!(config.ipfs, IpfsConfig::default());
        assert_eq!(config.fabric.chaincode, "ctitransfer104");
        assert_eq!(config.functions.create, "CreateCTIMetadata");
        assert_eq!(config.functions.list, "GetAllCTI");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_exchange_wiring() {
        let state = AppState {
            cti_dir: PathBuf::from("/tmp/cti"),
            config_path: PathBuf::from("/tmp/cti/config.toml"),
            config: AppConfig::default(),
        };
        let exchange = state.exchange("hvs.token").unwrap();
        assert_eq!(exchange.keys().mount(), "kv-v2");
        assert_eq!(exchange.records().functions().read, "ReadCTIMetadata");
    }
}
