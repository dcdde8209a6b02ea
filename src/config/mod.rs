//! Pipeline configuration.
//!
//! Loaded from a TOML file or built from defaults. Every field has a
//! default so a partial file (or none at all) still yields a working
//! configuration.

use std::path::Path;
use std::time::Duration;

use reelforge_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::stages::RetryPolicy;

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_max_ms() -> u64 {
    8_000
}

fn default_render_fan_out() -> usize {
    2
}

/// Tunables for the per-job pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Attempt budget per external stage call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the second attempt, in milliseconds. Doubles per retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound on any single backoff delay, in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Maximum concurrent scene renders per job.
    #[serde(default = "default_render_fan_out")]
    pub render_fan_out: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            render_fan_out: default_render_fan_out(),
        }
    }
}

impl PipelineConfig {
    /// The retry policy every stage call runs under.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.backoff_base_ms),
            max_delay: Duration::from_millis(self.backoff_max_ms),
        }
    }

    /// Render fan-out, clamped to at least one in-flight render.
    pub fn fan_out(&self) -> usize {
        self.render_fan_out.max(1)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pipeline tunables.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::validation(format!("invalid config {}: {e}", path.display())))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.pipeline.backoff_base_ms, 500);
        assert_eq!(config.pipeline.render_fan_out, 2);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pipeline]
            render_fan_out = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.render_fan_out, 4);
        assert_eq!(config.pipeline.max_attempts, 3);
    }

    #[test]
    fn test_empty_toml_is_valid() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.backoff_max_ms, 8_000);
    }

    #[test]
    fn test_retry_policy_bridge() {
        let pipeline = PipelineConfig {
            max_attempts: 0, // clamped
            backoff_base_ms: 250,
            ..PipelineConfig::default()
        };

        let policy = pipeline.retry_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nmax_attempts = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.pipeline.max_attempts, 5);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pipeline = \"not a table\"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
