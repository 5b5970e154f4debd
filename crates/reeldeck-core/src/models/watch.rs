use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::MediaIds;

// ── Synchronized snapshot records ───────────────────────────────

/// Watch state of a single movie, keyed by TMDB id in the movie bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedRecord {
    pub watched: bool,
    pub play_count: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
}

/// Watch state of a show, keyed by TMDB id in the show bucket.
///
/// `watched` reflects the tracker's show-level marker only. It is never
/// derived from episode completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedShowRecord {
    pub watched: bool,
    pub seasons: BTreeMap<u32, SeasonRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRecord {
    pub watched: bool,
    pub episodes: BTreeMap<u32, EpisodeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    pub watched: bool,
    pub play_count: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
}

/// Composite key of the flattened episode bucket: `{show}_{season}_{episode}`.
pub fn episode_key(show_id: u64, season: u32, episode: u32) -> String {
    format!("{show_id}_{season}_{episode}")
}

// ── Tracker payload, normalized at the client boundary ──────────

/// One entry of the tracker's bulk "watched movies" response.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedMovieEntry {
    pub ids: MediaIds,
    pub title: String,
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
}

/// One entry of the tracker's bulk "watched shows" response.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedShowEntry {
    pub ids: MediaIds,
    pub title: String,
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
    pub seasons: Vec<WatchedSeasonEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchedSeasonEntry {
    pub number: u32,
    pub episodes: Vec<WatchedEpisodeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchedEpisodeEntry {
    pub number: u32,
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
}
