// Network-backed collaborators (Vault, IPFS, Fabric)
pub mod adapters;
pub mod logging;

// App state (configuration, paths)
pub mod state;

pub use adapters::{FabricLedger, FabricSettings, IpfsContentStore, VaultSecretStore};
pub use logging::init_logging;
pub use state::{AppConfig, AppState, NetworkExchange, StateError};
