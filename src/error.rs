use thiserror::Error;

use crate::data::Weekday;
use crate::filters::FilterKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown day of week: {0:?}")]
pub struct UnknownDay(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time format: {0:?}")]
    InvalidClock(String),
    #[error("Missing \"to\" between times after {day}: {text:?}")]
    MissingSeparator { day: Weekday, text: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Filter {0} is listed more than once")]
    DuplicateFilter(FilterKind),
    #[error("Day {0} is ranked more than once")]
    DuplicateDay(Weekday),
    #[error("Priority ranks start at 1, got 0 for {0}")]
    ZeroRank(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("No chunks to reassemble")]
    Empty,
    #[error("Chunk {index} reports {found} total chunks, expected {expected}")]
    TotalMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Chunk {index} of {total} is missing")]
    MissingChunk { index: usize, total: usize },
    #[error("Chunk {0} was received more than once")]
    DuplicateChunk(usize),
    #[error("Chunk {index} is outside 0..{total}")]
    OutOfRange { index: usize, total: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Failed to encode or decode JSON payload")]
    Json(#[from] serde_json::Error),
}
