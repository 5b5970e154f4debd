//! Mutations on watch state.
//!
//! When the user is signed in to the tracker, every mutation is a tracker
//! write followed by a fresh full sync, so the snapshot only ever reflects
//! what the tracker reports. Signed out, mutations patch the local buckets
//! directly.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::models::{episode_key, EpisodeRecord, WatchTarget, WatchedRecord};
use crate::status::{load_bucket, WatchState};
use crate::store::{json_entry, read_json, write_json, KeyValueStore};
use crate::sync::{SyncResult, Synchronizer, EPISODES_KEY, MOVIES_KEY, SHOWS_KEY};
use crate::traits::WatchWriter;

pub const LOCAL_WATCHLIST_KEY: &str = "local_watchlist";

/// How a mutation was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Written to the tracker, then re-synced.
    Synced(SyncResult),
    /// Not signed in; applied to the local snapshot only.
    LocalOnly(WatchState),
}

impl ActionOutcome {
    pub fn state(&self) -> &WatchState {
        match self {
            Self::Synced(result) => &result.state,
            Self::LocalOnly(state) => state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    MarkWatched,
    UnmarkWatched,
    AddToWatchlist,
    RemoveFromWatchlist,
}

pub struct WatchActions<T> {
    sync: Synchronizer<T>,
}

impl<T: WatchWriter> WatchActions<T> {
    pub fn new(sync: Synchronizer<T>) -> Self {
        Self { sync }
    }

    pub fn synchronizer(&self) -> &Synchronizer<T> {
        &self.sync
    }

    pub async fn mark_watched(&self, target: &WatchTarget) -> Result<ActionOutcome, CoreError> {
        self.apply(Mutation::MarkWatched, target).await
    }

    pub async fn unmark_watched(&self, target: &WatchTarget) -> Result<ActionOutcome, CoreError> {
        self.apply(Mutation::UnmarkWatched, target).await
    }

    pub async fn add_to_watchlist(&self, target: &WatchTarget) -> Result<ActionOutcome, CoreError> {
        self.apply(Mutation::AddToWatchlist, target).await
    }

    pub async fn remove_from_watchlist(
        &self,
        target: &WatchTarget,
    ) -> Result<ActionOutcome, CoreError> {
        self.apply(Mutation::RemoveFromWatchlist, target).await
    }

    /// Local watchlist flag, maintained only while signed out.
    pub fn is_watchlisted_locally(&self, target: &WatchTarget) -> Result<bool, CoreError> {
        let Some(key) = watchlist_key(target) else {
            return Ok(false);
        };
        let list: BTreeSet<String> =
            read_json(self.sync.store().as_ref(), LOCAL_WATCHLIST_KEY)?.unwrap_or_default();
        Ok(list.contains(&key))
    }

    async fn apply(
        &self,
        mutation: Mutation,
        target: &WatchTarget,
    ) -> Result<ActionOutcome, CoreError> {
        let tracker = self.sync.source();

        if !tracker.is_authenticated() {
            debug!(?mutation, ?target, "Not signed in, applying mutation locally");
            let store = self.sync.store().as_ref();
            match mutation {
                Mutation::MarkWatched | Mutation::UnmarkWatched => {
                    patch_watched(store, target, mutation == Mutation::MarkWatched)?
                }
                Mutation::AddToWatchlist | Mutation::RemoveFromWatchlist => {
                    patch_watchlist(store, target, mutation == Mutation::AddToWatchlist)?
                }
            }
            return Ok(ActionOutcome::LocalOnly(WatchState::load(store)));
        }

        let written = match mutation {
            Mutation::MarkWatched => tracker.mark_watched(target).await,
            Mutation::UnmarkWatched => tracker.unmark_watched(target).await,
            Mutation::AddToWatchlist => tracker.add_to_watchlist(target).await,
            Mutation::RemoveFromWatchlist => tracker.remove_from_watchlist(target).await,
        };
        written.map_err(|e| CoreError::Tracker(e.to_string()))?;
        info!(?mutation, ?target, "Tracker write accepted, re-syncing");

        let result = self.sync.sync().await?;
        Ok(ActionOutcome::Synced(result))
    }
}

fn watchlist_key(target: &WatchTarget) -> Option<String> {
    let id = target.ids().join_key()?;
    Some(match target {
        WatchTarget::Movie(_) => format!("movie:{id}"),
        WatchTarget::Show(_) => format!("show:{id}"),
        WatchTarget::Episode { season, number, .. } => {
            format!("episode:{}", episode_key(id, *season, *number))
        }
    })
}

fn patch_watchlist(
    store: &dyn KeyValueStore,
    target: &WatchTarget,
    listed: bool,
) -> Result<(), CoreError> {
    let key = watchlist_key(target).ok_or(CoreError::MissingJoinKey)?;
    let mut list: BTreeSet<String> = read_json(store, LOCAL_WATCHLIST_KEY)?.unwrap_or_default();
    if listed {
        list.insert(key);
    } else {
        list.remove(&key);
    }
    write_json(store, LOCAL_WATCHLIST_KEY, &list)
}

fn patch_watched(
    store: &dyn KeyValueStore,
    target: &WatchTarget,
    watched: bool,
) -> Result<(), CoreError> {
    let id = target.ids().join_key().ok_or(CoreError::MissingJoinKey)?;
    let mut state = WatchState {
        movies: load_bucket(store, MOVIES_KEY),
        shows: load_bucket(store, SHOWS_KEY),
        episodes: load_bucket(store, EPISODES_KEY),
    };
    let now = Some(Utc::now());

    match (target, watched) {
        (WatchTarget::Movie(_), true) => {
            let record = state.movies.entry(id).or_insert(WatchedRecord {
                watched: true,
                play_count: 0,
                last_watched_at: None,
            });
            record.watched = true;
            record.play_count += 1;
            record.last_watched_at = now;
            write_json(store, MOVIES_KEY, &state.movies)?;
        }
        (WatchTarget::Movie(_), false) => {
            state.movies.remove(&id);
            write_json(store, MOVIES_KEY, &state.movies)?;
        }
        (WatchTarget::Show(_), true) => {
            state.shows.entry(id).or_default().watched = true;
            write_json(store, SHOWS_KEY, &state.shows)?;
        }
        (WatchTarget::Show(_), false) => {
            state.shows.remove(&id);
            let prefix = format!("{id}_");
            state.episodes.retain(|key, _| !key.starts_with(&prefix));
            store.set_many(&[
                json_entry(SHOWS_KEY, &state.shows)?,
                json_entry(EPISODES_KEY, &state.episodes)?,
            ])?;
        }
        (WatchTarget::Episode { season, number, .. }, true) => {
            let key = episode_key(id, *season, *number);
            let play_count = state.episodes.get(&key).map_or(0, |e| e.play_count) + 1;
            let record = EpisodeRecord {
                watched: true,
                play_count,
                last_watched_at: now,
            };
            state
                .shows
                .entry(id)
                .or_default()
                .seasons
                .entry(*season)
                .or_default()
                .episodes
                .insert(*number, record.clone());
            state.episodes.insert(key, record);
            store.set_many(&[
                json_entry(SHOWS_KEY, &state.shows)?,
                json_entry(EPISODES_KEY, &state.episodes)?,
            ])?;
        }
        (WatchTarget::Episode { season, number, .. }, false) => {
            state.episodes.remove(&episode_key(id, *season, *number));
            if let Some(season_record) = state
                .shows
                .get_mut(&id)
                .and_then(|show| show.seasons.get_mut(season))
            {
                season_record.episodes.remove(number);
            }
            store.set_many(&[
                json_entry(SHOWS_KEY, &state.shows)?,
                json_entry(EPISODES_KEY, &state.episodes)?,
            ])?;
        }
    }

    Ok(())
}
