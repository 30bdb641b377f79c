pub mod configuration;
pub use configuration::{CliArgs, Config};

pub mod error_handling;
pub use error_handling::{ConfigError, StorageError, WebError};

pub mod instrumentation;

pub mod storage;
pub use storage::{DatabaseStorage, User, UserStorage};

pub mod web_interface;
pub use web_interface::WebServer;
