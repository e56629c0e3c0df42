//! Error types for stylerag

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the question answering pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Passage store error: {0}")]
    PassageStore(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Reclassify a failure raised while embedding the question.
    pub fn into_embedding(self) -> Self {
        match self {
            Error::Embedding(_) => self,
            other => Error::Embedding(other.to_string()),
        }
    }

    /// Reclassify a failure raised while querying the vector index.
    pub fn into_search(self) -> Self {
        match self {
            Error::Search(_) => self,
            other => Error::Search(other.to_string()),
        }
    }

    /// Reclassify a failure raised by the generative model.
    pub fn into_generation(self) -> Self {
        match self {
            Error::Generation(_) => self,
            other => Error::Generation(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
