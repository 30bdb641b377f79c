use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application configuration structure that defines all runtime parameters.
///
/// Every field has a default so an empty (or absent) TOML file yields a
/// runnable service. Values are layered in this order, later sources winning:
///
/// 1. built-in defaults
/// 2. the TOML file given as first positional argument
/// 3. command-line flags, or their environment variables
///
/// # Examples
///
/// ```
/// use apm_demo::configuration::config::Config;
///
/// let config = Config::from_toml_str("[server]\nport = 8080\n").unwrap();
/// assert_eq!(config.server.port, 8080);
/// assert_eq!(config.log_level, "info");
/// ```
///
/// # Fields Overview
///
/// - `log_level`: minimum level handed to `env_logger` when `RUST_LOG` is unset
/// - `server`: bind address and port of the HTTP API
/// - `storage`: location of the SQLite database file
/// - `simulation`: defaults and limits of the latency/memory demo endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Command-line arguments.
///
/// Each override can also come from the environment; `PORT` keeps the
/// behaviour expected by hosting platforms.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "apm-demo")]
#[command(version)]
#[command(about = "Demo HTTP service for exercising APM agents")]
pub struct CliArgs {
    /// Optional TOML configuration file
    pub config_file: Option<PathBuf>,

    /// Port to listen on
    ///
    /// # Command Line
    /// Use `--port <PORT>` or the `PORT` environment variable
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// IP address to bind to
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Config {
    /// Resolves the final configuration from parsed command-line arguments.
    pub fn load(args: &CliArgs) -> Result<Config, ConfigError> {
        let mut config = match &args.config_file {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file. Missing sections fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Config::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref bind_address) = args.bind_address {
            self.server.bind_address = bind_address.clone();
        }
        if let Some(ref database_path) = args.database_path {
            self.storage.database_path = database_path.clone();
        }
        if let Some(ref log_level) = args.log_level {
            self.log_level = log_level.clone();
        }
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        IpAddr::from_str(&self.server.bind_address)
            .map_err(|_| ConfigError::BadAddressFormatting(self.server.bind_address.clone()))?;

        if self.server.port == 0 {
            return Err(ConfigError::BadPort(String::from(
                "port must be between 1 and 65535",
            )));
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        self.level_filter()?;

        if self.simulation.default_array_size > self.simulation.max_array_size {
            return Err(ConfigError::NotInRange(format!(
                "default_array_size ({}) exceeds max_array_size ({})",
                self.simulation.default_array_size, self.simulation.max_array_size
            )));
        }

        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::UnknownLogLevel(self.log_level.clone()))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = IpAddr::from_str(&self.server.bind_address)
            .map_err(|_| ConfigError::BadAddressFormatting(self.server.bind_address.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const OVERRIDE_VARS: [&str; 4] = ["PORT", "BIND_ADDRESS", "DATABASE_PATH", "LOG_LEVEL"];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            std::env::remove_var(var);
        }
    }

    fn args_under_test(extra: &[&str]) -> Result<CliArgs, clap::Error> {
        let mut argv = vec!["apm-demo"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.storage.database_path, PathBuf::from("data/app.db"));
        assert_eq!(config.simulation.default_delay_ms, 3000);
        assert_eq!(config.simulation.default_array_size, 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            log_level = "debug"

            [simulation]
            default_delay_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.simulation.default_delay_ms, 10);
        assert_eq!(config.simulation.external_call_delay_ms, 1500);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\ndatabase_path = \"/tmp/users.db\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/users.db"));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::BadPort(_))));

        let mut config = Config::default();
        config.server.bind_address = String::from("localhost:80");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadAddressFormatting(_))
        ));

        let mut config = Config::default();
        config.log_level = String::from("loud");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownLogLevel(_))
        ));

        let mut config = Config::default();
        config.storage.database_path = PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyDatabasePath)
        ));

        let mut config = Config::default();
        config.simulation.max_array_size = 10;
        assert!(matches!(config.validate(), Err(ConfigError::NotInRange(_))));
    }

    #[test]
    #[serial]
    fn test_cli_overrides_file() {
        clear_override_vars();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 4000\nbind_address = \"127.0.0.1\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = args_under_test(&[&path, "--port", "5000", "--log-level", "warn"]).unwrap();
        let config = Config::load(&args).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Warn);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_port_from_environment() {
        clear_override_vars();
        std::env::set_var("PORT", "8123");
        let args = args_under_test(&[]);
        std::env::remove_var("PORT");

        let config = Config::load(&args.unwrap()).unwrap();
        assert_eq!(config.server.port, 8123);
    }
}
