use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use reeldeck_core::models::{
    MediaIds, WatchTarget, WatchedEpisodeEntry, WatchedMovieEntry, WatchedSeasonEntry,
    WatchedShowEntry,
};

use super::error::TraktError;

// ── Shared objects ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktIds {
    pub trakt: Option<u64>,
    pub slug: Option<String>,
    pub imdb: Option<String>,
    pub tmdb: Option<u64>,
    pub tvdb: Option<u64>,
}

impl From<TraktIds> for MediaIds {
    fn from(ids: TraktIds) -> Self {
        MediaIds {
            trakt: ids.trakt,
            tmdb: ids.tmdb,
            imdb: ids.imdb,
            slug: ids.slug,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraktMovie {
    pub title: Option<String>,
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: TraktIds,
    pub runtime: Option<u32>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraktShow {
    pub title: Option<String>,
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: TraktIds,
    pub aired_episodes: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraktEpisode {
    pub season: u32,
    pub number: u32,
    pub title: Option<String>,
    #[serde(default)]
    pub ids: TraktIds,
}

// ── /sync/watched ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct WatchedMovieItem {
    #[serde(default)]
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
    pub movie: TraktMovie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchedShowItem {
    #[serde(default)]
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<WatchedSeason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<WatchedEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchedEpisode {
    pub number: u32,
    #[serde(default)]
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
}

// ── Other reads ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistItem {
    pub rank: Option<u32>,
    pub listed_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: String,
    pub movie: Option<TraktMovie>,
    pub show: Option<TraktShow>,
    pub episode: Option<TraktEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem {
    pub id: u64,
    pub watched_at: DateTime<Utc>,
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub movie: Option<TraktMovie>,
    pub show: Option<TraktShow>,
    pub episode: Option<TraktEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaStats {
    #[serde(default)]
    pub plays: u64,
    #[serde(default)]
    pub watched: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub ratings: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub movies: MediaStats,
    #[serde(default)]
    pub shows: MediaStats,
    #[serde(default)]
    pub episodes: MediaStats,
}

/// Entry of `/calendars/my/shows` (first_aired) or `/calendars/my/movies` (released).
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEntry {
    pub first_aired: Option<DateTime<Utc>>,
    pub released: Option<String>,
    pub episode: Option<TraktEpisode>,
    pub show: Option<TraktShow>,
    pub movie: Option<TraktMovie>,
}

// ── Write responses ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncCounts {
    #[serde(default)]
    pub movies: u32,
    #[serde(default)]
    pub shows: u32,
    #[serde(default)]
    pub seasons: u32,
    #[serde(default)]
    pub episodes: u32,
}

/// Response body of every `/sync/*` write.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResponse {
    pub added: Option<SyncCounts>,
    pub deleted: Option<SyncCounts>,
    pub existing: Option<SyncCounts>,
    pub not_found: Option<Value>,
}

// ── OAuth ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub created_at: Option<u64>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
    #[allow(dead_code)]
    pub scope: Option<String>,
}

// ── Conversions to core types ───────────────────────────────────

impl WatchedMovieItem {
    pub fn into_entry(self) -> WatchedMovieEntry {
        WatchedMovieEntry {
            title: self.movie.title.unwrap_or_default(),
            ids: self.movie.ids.into(),
            plays: self.plays,
            last_watched_at: self.last_watched_at,
        }
    }
}

impl WatchedShowItem {
    pub fn into_entry(self) -> WatchedShowEntry {
        WatchedShowEntry {
            title: self.show.title.unwrap_or_default(),
            ids: self.show.ids.into(),
            plays: self.plays,
            last_watched_at: self.last_watched_at,
            seasons: self
                .seasons
                .into_iter()
                .map(|season| WatchedSeasonEntry {
                    number: season.number,
                    episodes: season
                        .episodes
                        .into_iter()
                        .map(|ep| WatchedEpisodeEntry {
                            number: ep.number,
                            plays: ep.plays,
                            last_watched_at: ep.last_watched_at,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// ── Request bodies ──────────────────────────────────────────────

/// Build the `/sync/*` request body addressing `target` by Trakt id.
/// `rating`, when set, is attached to the addressed item.
pub fn sync_body(target: &WatchTarget, rating: Option<u8>) -> Result<Value, TraktError> {
    let trakt_id = target.ids().tracker_id().ok_or(TraktError::MissingId)?;
    let mut item = json!({ "ids": { "trakt": trakt_id } });

    let key = match target {
        WatchTarget::Movie(_) => "movies",
        WatchTarget::Show(_) => "shows",
        WatchTarget::Episode { season, number, .. } => {
            let mut episode = json!({ "number": number });
            if let Some(r) = rating {
                episode["rating"] = json!(r);
            }
            item["seasons"] = json!([{ "number": season, "episodes": [episode] }]);
            return Ok(json!({ "shows": [item] }));
        }
    };
    if let Some(r) = rating {
        item["rating"] = json!(r);
    }
    Ok(json!({ key: [item] }))
}
