pub mod types;

pub use types::{ConfigError, StorageError, WebError};
