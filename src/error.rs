use std::io;
use std::path::PathBuf;

/// Errors and statuses of an aggregation pass.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
    #[error("Feed contained no usable observations")]
    EmptyFeed,
}

/// Errors reading a feed document from disk.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("Failed to read feed {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to decode feed: {0}")]
    Decode(#[from] serde_json::Error),
}
