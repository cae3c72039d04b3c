mod memory;
mod provider;

pub use memory::MemoryContentStore;
pub use provider::{ContentId, ContentStore, ContentStoreError};
