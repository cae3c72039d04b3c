mod memory;
mod provider;

pub use memory::MemorySecretStore;
pub use provider::{SecretStore, SecretStoreError};
