//! Error types for lineage-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineageError {
    #[error("Incomparable date: {0}")]
    IncomparableDate(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config read error: {0}")]
    ConfigRead(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LineageError>;
