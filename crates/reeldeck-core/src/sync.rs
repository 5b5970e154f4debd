//! Watch-state synchronizer.
//!
//! Pulls the full watched state from the tracker, re-keys it by TMDB id and
//! replaces the three snapshot buckets in the store. A sync never merges with
//! the previous snapshot: whatever the tracker returned is the new truth.

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::models::{
    episode_key, EpisodeRecord, SeasonRecord, WatchedMovieEntry, WatchedRecord,
    WatchedShowEntry, WatchedShowRecord,
};
use crate::status::{load_bucket, WatchState};
use crate::store::{json_entry, KeyValueStore, SharedStore};
use crate::traits::WatchSource;

pub const MOVIES_KEY: &str = "trakt_watched_movies";
pub const SHOWS_KEY: &str = "trakt_watched_shows";
pub const EPISODES_KEY: &str = "trakt_watched_episodes";

/// What a sync produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    /// The snapshot now in the store.
    pub state: WatchState,
    /// Entries dropped because they had no TMDB id.
    pub skipped: usize,
    /// The movie pull failed; the movie bucket kept its previous contents.
    pub movies_failed: bool,
    /// The show pull failed; show and episode buckets kept their previous contents.
    pub shows_failed: bool,
}

impl SyncResult {
    pub fn is_partial(&self) -> bool {
        self.movies_failed || self.shows_failed
    }
}

/// Orchestrates a full pull from a [`WatchSource`] into the store.
pub struct Synchronizer<S> {
    source: S,
    store: SharedStore,
}

impl<S: WatchSource> Synchronizer<S> {
    pub fn new(source: S, store: SharedStore) -> Self {
        Self { source, store }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Current snapshot, without syncing.
    pub fn snapshot(&self) -> WatchState {
        WatchState::load(self.store.as_ref())
    }

    /// Run a full sync. Unauthenticated is a no-op returning an empty result.
    pub async fn sync(&self) -> Result<SyncResult, CoreError> {
        self.sync_cancellable(&CancellationToken::new()).await
    }

    /// Run a full sync, dropping the responses if `cancel` fires before they
    /// arrive. A cancelled sync writes nothing. The replaced buckets are
    /// written in one batch, so a failed write leaves the previous snapshot.
    pub async fn sync_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<SyncResult, CoreError> {
        if !self.source.is_authenticated() {
            debug!("Not authenticated with tracker, skipping sync");
            return Ok(SyncResult::default());
        }
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let fetch = async {
            futures::join!(self.source.watched_movies(), self.source.watched_shows())
        };
        let (movies, shows) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Sync cancelled, dropping in-flight responses");
                return Err(CoreError::Cancelled);
            }
            pair = fetch => pair,
        };

        let (movies, shows) = match (movies, shows) {
            (Err(m), Err(s)) => {
                warn!(movies = %m, shows = %s, "Both watched pulls failed, keeping previous snapshot");
                return Err(CoreError::SyncFailed {
                    movies: m.to_string(),
                    shows: s.to_string(),
                });
            }
            (m, s) => (m, s),
        };

        let store = self.store.as_ref();
        let mut result = SyncResult::default();

        // Build every map before the first write.
        let movie_bucket = match movies {
            Ok(entries) => {
                let (bucket, skipped) = build_movie_bucket(&entries);
                result.skipped += skipped;
                Some(bucket)
            }
            Err(e) => {
                warn!(error = %e, "Watched movies pull failed, keeping previous movie bucket");
                result.movies_failed = true;
                None
            }
        };
        let show_buckets = match shows {
            Ok(entries) => {
                let (shows, episodes, skipped) = build_show_buckets(&entries);
                result.skipped += skipped;
                Some((shows, episodes))
            }
            Err(e) => {
                warn!(error = %e, "Watched shows pull failed, keeping previous show buckets");
                result.shows_failed = true;
                None
            }
        };

        let mut writes = Vec::with_capacity(3);
        if let Some(bucket) = &movie_bucket {
            writes.push(json_entry(MOVIES_KEY, bucket)?);
        }
        if let Some((shows, episodes)) = &show_buckets {
            writes.push(json_entry(SHOWS_KEY, shows)?);
            writes.push(json_entry(EPISODES_KEY, episodes)?);
        }
        store.set_many(&writes)?;

        result.state.movies = movie_bucket.unwrap_or_else(|| load_bucket(store, MOVIES_KEY));
        (result.state.shows, result.state.episodes) = show_buckets.unwrap_or_else(|| {
            (
                load_bucket(store, SHOWS_KEY),
                load_bucket(store, EPISODES_KEY),
            )
        });

        info!(
            movies = result.state.movies.len(),
            shows = result.state.shows.len(),
            episodes = result.state.episodes.len(),
            skipped = result.skipped,
            partial = result.is_partial(),
            "Watch-state sync complete"
        );
        Ok(result)
    }
}

/// Re-key watched movies by TMDB id. Returns the bucket and the number of
/// entries skipped for lacking an id.
pub fn build_movie_bucket(entries: &[WatchedMovieEntry]) -> (BTreeMap<u64, WatchedRecord>, usize) {
    let mut bucket = BTreeMap::new();
    let mut skipped = 0;

    for entry in entries {
        let Some(tmdb_id) = entry.ids.join_key() else {
            warn!(title = %entry.title, trakt = ?entry.ids.trakt, "Skipping watched movie without TMDB id");
            skipped += 1;
            continue;
        };
        bucket.insert(
            tmdb_id,
            WatchedRecord {
                watched: true,
                play_count: entry.plays,
                last_watched_at: entry.last_watched_at,
            },
        );
    }

    (bucket, skipped)
}

/// Re-key watched shows by TMDB id and flatten their episodes into
/// `{show}_{season}_{episode}` keys.
pub fn build_show_buckets(
    entries: &[WatchedShowEntry],
) -> (
    BTreeMap<u64, WatchedShowRecord>,
    BTreeMap<String, EpisodeRecord>,
    usize,
) {
    let mut shows = BTreeMap::new();
    let mut episodes = BTreeMap::new();
    let mut skipped = 0;

    for entry in entries {
        let Some(tmdb_id) = entry.ids.join_key() else {
            warn!(title = %entry.title, trakt = ?entry.ids.trakt, "Skipping watched show without TMDB id");
            skipped += 1;
            continue;
        };

        let mut record = WatchedShowRecord {
            watched: true,
            seasons: BTreeMap::new(),
        };
        for season in &entry.seasons {
            let mut season_record = SeasonRecord {
                watched: true,
                episodes: BTreeMap::new(),
            };
            for ep in &season.episodes {
                let ep_record = EpisodeRecord {
                    watched: true,
                    play_count: ep.plays,
                    last_watched_at: ep.last_watched_at,
                };
                episodes.insert(
                    episode_key(tmdb_id, season.number, ep.number),
                    ep_record.clone(),
                );
                season_record.episodes.insert(ep.number, ep_record);
            }
            record.seasons.insert(season.number, season_record);
        }
        shows.insert(tmdb_id, record);
    }

    (shows, episodes, skipped)
}

/// Drop the synced snapshot (explicit logout).
pub fn clear_snapshot(store: &dyn KeyValueStore) -> Result<(), CoreError> {
    store.remove(MOVIES_KEY)?;
    store.remove(SHOWS_KEY)?;
    store.remove(EPISODES_KEY)?;
    Ok(())
}
