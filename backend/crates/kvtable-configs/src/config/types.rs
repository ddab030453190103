use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration, usually loaded from `kvtable.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KvTableConfig {
    #[serde(default)]
    pub table: TableSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Remote table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Remote table id every cell is stored under
    #[serde(default = "default_table_name")]
    pub name: String,
    /// Largest encoded partition or row key the store accepts, in bytes
    #[serde(default = "default_max_key_bytes")]
    pub max_key_bytes: usize,
    /// Per-request deadline; unset means requests never time out client-side
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: Option<u64>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            name: default_table_name(),
            max_key_bytes: default_max_key_bytes(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    #[serde(default = "default_log_file_path")]
    pub file_path: String,
    /// Optional per-target log level overrides
    /// Configure via a TOML table:
    /// [logging.targets]
    /// kvtable_store = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_to_console: default_true(),
            file_path: default_log_file_path(),
            targets: HashMap::new(),
        }
    }
}
