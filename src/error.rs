use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of every error the tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Endpoint,
    Transport,
    Status,
    Body,
    Decode,
    TaskFetch,
    TaskStatus,
    TaskName,
    TaskCreate,
    TaskBody,
    TaskWrite,
    TaskTimeout,
}

/// Failures while resolving the list of wallpaper links. All of them abort the run.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid search endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        source: url::ParseError,
    },

    #[error("Search request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Search request returned status {0}")]
    Status(u16),

    #[error("Failed to read search response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Endpoint { .. } => ErrorKind::Endpoint,
            ResolveError::Transport(_) => ErrorKind::Transport,
            ResolveError::Status(_) => ErrorKind::Status,
            ResolveError::Body(_) => ErrorKind::Body,
            ResolveError::Decode(_) => ErrorKind::Decode,
        }
    }
}

/// Failure of a single download task. Never crosses the task boundary.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Request error: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Cannot name a file after {0}")]
    InvalidName(String),

    #[error("Not able to create file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Connection dropped while reading body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Not able to write to file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Fetch(_) => ErrorKind::TaskFetch,
            TaskError::Status(_) => ErrorKind::TaskStatus,
            TaskError::InvalidName(_) => ErrorKind::TaskName,
            TaskError::Create { .. } => ErrorKind::TaskCreate,
            TaskError::Body(_) => ErrorKind::TaskBody,
            TaskError::Write { .. } => ErrorKind::TaskWrite,
            TaskError::Timeout(_) => ErrorKind::TaskTimeout,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a pictures or home directory")]
    NoPictureDir,

    #[error("{} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Could not create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}
