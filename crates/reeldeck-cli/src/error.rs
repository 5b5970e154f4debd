use reeldeck_api::trakt::TraktError;
use reeldeck_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Trakt(#[from] TraktError),

    #[error("not signed in to Trakt, run `reeldeck login` first")]
    NotSignedIn,

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Trakt rejected the stored token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Trakt(e) if e.status() == Some(401))
    }
}
