mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Cloud, Cycle, Database, Logger, Server, Settings, TokenCache};
pub use storage::Storage;
