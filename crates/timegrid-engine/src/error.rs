//! Error types for timegrid-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimegridError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid hour range: {0}")]
    InvalidHourRange(String),

    #[error("Invalid slot granularity: {0}")]
    InvalidGranularity(String),

    #[error("Invalid hour parts: {0}")]
    InvalidHourParts(String),

    #[error("Invalid week start day: {0}")]
    InvalidWeekStart(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid label format: {0}")]
    InvalidFormat(String),

    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
}

pub type Result<T> = std::result::Result<T, TimegridError>;
