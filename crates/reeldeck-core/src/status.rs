//! Read-side lookups against the last synced snapshot.
//!
//! All lookups are synchronous map reads. Nothing here touches the network.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::models::{episode_key, EpisodeRecord, WatchedRecord, WatchedShowRecord};
use crate::store::{read_json, KeyValueStore};
use crate::sync::{EPISODES_KEY, MOVIES_KEY, SHOWS_KEY};

/// The three watch-state buckets, as written by the last successful sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    pub movies: BTreeMap<u64, WatchedRecord>,
    pub shows: BTreeMap<u64, WatchedShowRecord>,
    pub episodes: BTreeMap<String, EpisodeRecord>,
}

impl WatchState {
    /// Load the snapshot from the store. Missing or unreadable buckets load
    /// as empty, so a corrupt bucket degrades to "unwatched".
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            movies: load_bucket(store, MOVIES_KEY),
            shows: load_bucket(store, SHOWS_KEY),
            episodes: load_bucket(store, EPISODES_KEY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty() && self.episodes.is_empty()
    }

    pub fn is_movie_watched(&self, tmdb_id: u64) -> bool {
        self.movies.get(&tmdb_id).is_some_and(|m| m.watched)
    }

    /// Play count from the tracker, 0 when unknown.
    pub fn movie_watch_count(&self, tmdb_id: u64) -> u32 {
        self.movies.get(&tmdb_id).map_or(0, |m| m.play_count)
    }

    /// Show-level marker only; says nothing about individual episodes.
    pub fn is_show_watched(&self, tmdb_id: u64) -> bool {
        self.shows.get(&tmdb_id).is_some_and(|s| s.watched)
    }

    pub fn is_episode_watched(&self, tmdb_id: u64, season: u32, episode: u32) -> bool {
        self.episodes
            .get(&episode_key(tmdb_id, season, episode))
            .is_some_and(|e| e.watched)
    }

    /// Every synced episode of a show, keyed `"{season}_{episode}"`.
    pub fn episode_watch_statuses_for_show(&self, tmdb_id: u64) -> BTreeMap<String, bool> {
        let prefix = format!("{tmdb_id}_");
        self.episodes_with_prefix(&prefix)
            .filter_map(|(key, record)| {
                key.strip_prefix(&prefix)
                    .map(|rest| (rest.to_string(), record.watched))
            })
            .collect()
    }

    /// Number of watched episodes recorded for one season.
    pub fn watched_episode_count(&self, tmdb_id: u64, season: u32) -> usize {
        let prefix = format!("{tmdb_id}_{season}_");
        self.episodes_with_prefix(&prefix)
            .filter(|(_, record)| record.watched)
            .count()
    }

    /// Keys sharing `prefix` sort next to each other, so this walks one run
    /// of the episode map instead of all of it.
    fn episodes_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a EpisodeRecord)> + 'a {
        self.episodes
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
    }

    /// Derived from the episode bucket, never from a season flag.
    pub fn is_season_fully_watched(&self, tmdb_id: u64, season: u32, total_episodes: usize) -> bool {
        total_episodes > 0 && self.watched_episode_count(tmdb_id, season) == total_episodes
    }
}

pub(crate) fn load_bucket<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match read_json::<T>(store, key) {
        Ok(Some(bucket)) => bucket,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Unreadable watch-state bucket, treating as empty");
            T::default()
        }
    }
}
