//! Counter configuration
//!
//! ```rust
//! use rvoip_session_counter::{Direction, SessionCounter, SessionCounterConfig};
//!
//! let config = SessionCounterConfig::new("trunk-a")
//!     .with_default_direction(Direction::In);
//! let counter = SessionCounter::with_config(config).unwrap();
//! assert_eq!(counter.name(), "trunk-a");
//! ```

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::errors::{CounterError, Result};

/// Name used when none is configured.
pub const DEFAULT_COUNTER_NAME: &str = "SessionCounter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionCounterConfig {
    /// Reported by the counter's summary and joined on merge.
    pub name: String,
    /// Label applied to messages fed without one.
    pub default_direction: Direction,
}

impl Default for SessionCounterConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COUNTER_NAME.to_string(),
            default_direction: Direction::Both,
        }
    }
}

impl SessionCounterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CounterError::Config("counter name must not be empty".to_string()));
        }
        Ok(())
    }
}
