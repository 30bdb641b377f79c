use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    BadAddressFormatting(String),
    BadPort(String),
    EmptyDatabasePath,
    UnknownLogLevel(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadAddressFormatting(e) => write!(f, "Address formatting error: {}", e),
            ConfigError::BadPort(e) => write!(f, "Port error: {}", e),
            ConfigError::EmptyDatabasePath => write!(f, "Storage error: database path is empty"),
            ConfigError::UnknownLogLevel(e) => write!(f, "Unknown log level: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures surfaced by the user storage layer.
///
/// A lookup that matches nothing is not an error; it is reported as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Directory creation, store opening, schema creation or seeding failed.
    /// Fatal at startup.
    InitializationFailed(String),
    /// A store-enforced constraint rejected the write (duplicate email).
    ConstraintViolation(String),
    ReadFailed(String),
    WriteFailed(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InitializationFailed(e) => {
                write!(f, "Storage initialization failed: {}", e)
            }
            StorageError::ConstraintViolation(e) => write!(f, "Constraint violation: {}", e),
            StorageError::ReadFailed(e) => write!(f, "Storage read failed: {}", e),
            StorageError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug)]
pub enum WebError {
    SignalHandler(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::SignalHandler(e) => write!(f, "Unable to listen for shutdown signal: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::ConstraintViolation("UNIQUE constraint failed: users.email".into());
        assert_eq!(
            err.to_string(),
            "Constraint violation: UNIQUE constraint failed: users.email"
        );
        assert_eq!(
            StorageError::ReadFailed("disk".into()).to_string(),
            "Storage read failed: disk"
        );
    }

    #[test]
    fn test_config_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
