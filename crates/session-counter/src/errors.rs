//! Error types for the session counter

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    #[error("Invalid direction label: {0:?}")]
    InvalidDirection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot merge an empty set of counters")]
    EmptyMerge,
}

pub type Result<T> = std::result::Result<T, CounterError>;
