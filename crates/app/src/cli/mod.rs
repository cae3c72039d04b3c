pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Delete, Init, List, Publish, Retrieve, Version};
