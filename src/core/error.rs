use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Duplicate kingdom loc in dump: {0}")]
    DuplicateLoc(String),

    #[error("Dump fetch error: {0}")]
    Fetch(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;
