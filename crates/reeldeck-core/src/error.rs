use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("sync failed: movies: {movies}; shows: {shows}")]
    SyncFailed { movies: String, shows: String },

    #[error("item has no TMDB id")]
    MissingJoinKey,

    #[error("sync cancelled before the snapshot was written")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
