pub mod delete;
pub mod init;
pub mod list;
pub mod publish;
pub mod retrieve;
pub mod version;

pub use delete::Delete;
pub use init::Init;
pub use list::List;
pub use publish::Publish;
pub use retrieve::Retrieve;
pub use version::Version;
