use thiserror::Error;

/// Why a metadata lookup produced nothing.
///
/// Lookups never fail hard: callers fall back to placeholder art or omit the
/// field, and only use the distinction for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionMiss {
    #[error("no such title")]
    NotFound,

    #[error("metadata unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ResolutionMiss {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}
