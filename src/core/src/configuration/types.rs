use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage::database_storage::DatabaseStorage;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("0.0.0.0"),
            port: 3000,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; its parent directory is created on startup if missing
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DatabaseStorage::DEFAULT_DB_FILE),
        }
    }
}

/// Knobs for the artificial latency and memory endpoints.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay used by `/api/slow-query` when no usable `delay` is given
    pub default_delay_ms: u64,
    /// Element count used by `/api/memory-intensive` when no usable `size` is given
    pub default_array_size: usize,
    /// Upper bound accepted for `size`
    pub max_array_size: usize,
    pub external_call_delay_ms: u64,
    /// Pause between the steps of `/api/complex-operation`
    pub complex_step_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 3000,
            default_array_size: 1_000_000,
            max_array_size: 10_000_000,
            external_call_delay_ms: 1500,
            complex_step_delay_ms: 500,
        }
    }
}
