use thiserror::Error;

/// Failures of the embedding layer. `Unavailable` is kept apart from everything else so
/// callers can fall back to tag/category-only scoring instead of treating a provider outage
/// as "profiles are dissimilar".
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding input is empty")]
    EmptyInput,
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding generation unavailable: {0}")]
    Unavailable(String),
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

impl EmbeddingError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EmbeddingError::Unavailable(_))
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EmbeddingError::InvalidResponse(err.to_string())
        } else {
            EmbeddingError::Unavailable(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("query expansion failed: {0}")]
    QueryExpansion(String),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
