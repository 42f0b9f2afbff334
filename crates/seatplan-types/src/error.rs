//! Error types for seatplan

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),
}

/// Errors raised by manual group assignment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("No capacity available in any group")]
    NoCapacity,

    #[error("Unknown student: {0}")]
    UnknownStudent(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(u32),

    #[error("Invalid order for group {group}: {reason}")]
    InvalidOrder { group: u32, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Batch {batch} failed: {message}")]
    BatchFailed { batch: usize, message: String },

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
