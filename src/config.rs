//! Cluster Configuration
//!
//! The dispatch layer has a single knob: how long a dispatch call waits for
//! instructions before excluding the members that have not answered.
//!
//! Sources, lowest precedence first: built-in default, the `[cluster]` table of a
//! TOML file, then the `CLUSTER_INSTRUCTION_TIMEOUT` environment variable.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default instruction timeout (two minutes).
pub const DEFAULT_INSTRUCTION_TIMEOUT_MS: u64 = 120_000;

/// Environment variable overriding the instruction timeout, in milliseconds.
pub const INSTRUCTION_TIMEOUT_ENV: &str = "CLUSTER_INSTRUCTION_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClusterConfig {
    /// How long a dispatch waits for instructions to finish before giving up, in milliseconds.
    #[serde(rename = "instruction-timeout")]
    pub instruction_timeout_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    cluster: ClusterConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            instruction_timeout_ms: DEFAULT_INSTRUCTION_TIMEOUT_MS,
        }
    }
}

impl ClusterConfig {
    pub fn with_instruction_timeout(timeout: Duration) -> Self {
        Self {
            instruction_timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn instruction_timeout(&self) -> Duration {
        Duration::from_millis(self.instruction_timeout_ms)
    }

    /// Parses a TOML document. Only the `[cluster]` table is read; a missing
    /// table or key falls back to the default.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(source).context("Invalid cluster configuration")?;
        file.cluster.validate()?;
        Ok(file.cluster)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
    }

    /// Applies the process environment on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(INSTRUCTION_TIMEOUT_ENV) {
            self.instruction_timeout_ms = parse_timeout_ms(&raw)
                .with_context(|| format!("Invalid value for {}", INSTRUCTION_TIMEOUT_ENV))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.instruction_timeout_ms == 0 {
            bail!("instruction-timeout must be greater than zero");
        }
        Ok(())
    }
}

/// Parses a millisecond count such as `"5000"`.
pub fn parse_timeout_ms(raw: &str) -> Result<u64> {
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number of milliseconds", raw))?;
    if value == 0 {
        bail!("timeout must be greater than zero");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_timeout_is_two_minutes() {
        let config = ClusterConfig::default();

        assert_eq!(config.instruction_timeout_ms, 120_000);
        assert_eq!(config.instruction_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_from_toml_reads_cluster_table() {
        let config = ClusterConfig::from_toml_str(
            r#"
            [cluster]
            instruction-timeout = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.instruction_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_from_toml_missing_table_uses_default() {
        let config = ClusterConfig::from_toml_str("[other]\nkey = 1\n").unwrap();

        assert_eq!(config, ClusterConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_zero_timeout() {
        let result = ClusterConfig::from_toml_str("[cluster]\ninstruction-timeout = 0\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_wins() {
        let env: HashMap<&str, &str> = [(INSTRUCTION_TIMEOUT_ENV, "250")].into_iter().collect();

        let config = ClusterConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.instruction_timeout_ms, 250);
    }

    #[test]
    fn test_env_override_absent_keeps_value() {
        let config = ClusterConfig::with_instruction_timeout(Duration::from_millis(900))
            .with_overrides(|_| None)
            .unwrap();

        assert_eq!(config.instruction_timeout_ms, 900);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let result = ClusterConfig::default().with_overrides(|_| Some("soon".to_string()));

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains(INSTRUCTION_TIMEOUT_ENV));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("cluster-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[cluster]\ninstruction-timeout = 1234\n").unwrap();

        let config = ClusterConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.instruction_timeout_ms, 1234);
    }
}
