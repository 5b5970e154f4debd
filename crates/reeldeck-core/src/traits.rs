//! Seams between the synchronizer and the remote tracker.
//!
//! The Trakt client in `reeldeck-api` implements both traits; tests implement
//! them with in-memory fakes.

use std::future::Future;

use crate::models::{WatchTarget, WatchedMovieEntry, WatchedShowEntry};

/// Read side of the tracker: authentication state and the two bulk pulls.
pub trait WatchSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// True iff a persisted access token exists. No network.
    fn is_authenticated(&self) -> bool;

    /// All watched movies, with metadata ids inline.
    fn watched_movies(
        &self,
    ) -> impl Future<Output = Result<Vec<WatchedMovieEntry>, Self::Error>> + Send;

    /// All watched shows, with per-season episode plays.
    fn watched_shows(
        &self,
    ) -> impl Future<Output = Result<Vec<WatchedShowEntry>, Self::Error>> + Send;
}

/// Write side of the tracker. Every call addresses the item by tracker id.
pub trait WatchWriter: WatchSource {
    fn mark_watched(
        &self,
        target: &WatchTarget,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn unmark_watched(
        &self,
        target: &WatchTarget,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn add_to_watchlist(
        &self,
        target: &WatchTarget,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn remove_from_watchlist(
        &self,
        target: &WatchTarget,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
