mod sqlite;
mod trait_def;

pub use sqlite::SqliteLinkStore;
pub use trait_def::{LinkStore, StorageError, StorageResult};
