//! Layered configuration: TOML file first, then command-line overrides

use std::fs;
use std::path::Path;

use anyhow::Context;
use rvoip_session_counter::SessionCounterConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Contents of the optional `--config` file.
///
/// ```toml
/// [counter]
/// name = "trunk-a"
/// default_direction = "IN"
///
/// [logging]
/// level = "debug"
/// json = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub counter: SessionCounterConfig,
    pub logging: LoggingConfig,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Invalid configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvoip_session_counter::Direction;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(CliConfig::from_toml("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = CliConfig::from_toml(
            "[counter]\nname = \"trunk-a\"\ndefault_direction = \"OUT\"\n\n[logging]\nlevel = \"debug\"\njson = true\n",
        )
        .unwrap();
        assert_eq!(config.counter.name, "trunk-a");
        assert_eq!(config.counter.default_direction, Direction::Out);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_bad_direction_rejected() {
        assert!(CliConfig::from_toml("[counter]\ndefault_direction = \"UP\"\n").is_err());
    }
}
