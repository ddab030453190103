use super::types::KvTableConfig;
use std::env;
use std::fs;
use std::path::Path;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];

impl KvTableConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: KvTableConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - KVTABLE_TABLE_NAME: Override table.name
    /// - KVTABLE_REQUEST_TIMEOUT_MS: Override table.request_timeout_ms
    /// - KVTABLE_LOG_LEVEL: Override logging.level
    ///
    /// Environment variables take precedence over file values. Call
    /// `validate()` afterwards.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(name) = env::var("KVTABLE_TABLE_NAME") {
            self.table.name = name;
        }

        if let Ok(timeout) = env::var("KVTABLE_REQUEST_TIMEOUT_MS") {
            let millis = timeout.parse().map_err(|_| {
                anyhow::anyhow!("Invalid KVTABLE_REQUEST_TIMEOUT_MS value: {}", timeout)
            })?;
            self.table.request_timeout_ms = Some(millis);
        }

        if let Ok(level) = env::var("KVTABLE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.table.name.trim().is_empty() {
            return Err(anyhow::anyhow!("table.name cannot be empty"));
        }

        if self.table.max_key_bytes == 0 {
            return Err(anyhow::anyhow!("table.max_key_bytes cannot be 0"));
        }

        if self.table.request_timeout_ms == Some(0) {
            return Err(anyhow::anyhow!("table.request_timeout_ms cannot be 0"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        Ok(())
    }
}
