use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── GraphQL response wrappers ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: PageData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub media: Vec<AniListMedia>,
    #[serde(default, rename = "airingSchedules")]
    pub airing_schedules: Vec<AiringSchedule>,
}

// ── Media ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub episodes: Option<u32>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    #[serde(rename = "meanScore")]
    pub mean_score: Option<u32>,
    pub season: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<i32>,
    pub genres: Option<Vec<String>>,
    pub format: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "nextAiringEpisode")]
    pub next_airing_episode: Option<NextAiring>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextAiring {
    pub episode: u32,
    #[serde(rename = "airingAt")]
    pub airing_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct AiringSchedule {
    pub episode: u32,
    #[serde(rename = "airingAt")]
    pub airing_at: i64,
    pub media: AniListMedia,
}

// ── Catalog records ──────────────────────────────────────────────

/// An anime as listed in catalog feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: u64,
    /// English title when present, else romaji.
    pub title: String,
    pub native_title: Option<String>,
    pub cover_url: Option<String>,
    pub episodes: Option<u32>,
    pub mean_score: Option<u32>,
    pub season: Option<String>,
    pub season_year: Option<i32>,
    pub genres: Vec<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub next_episode: Option<u32>,
}

/// An episode airing inside the requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiringEpisode {
    pub media_id: u64,
    pub title: String,
    pub episode: u32,
    pub airing_at: DateTime<Utc>,
}

impl AniListMedia {
    fn display_title(&self) -> String {
        self.title
            .as_ref()
            .and_then(|t| t.english.clone().or_else(|| t.romaji.clone()))
            .unwrap_or_default()
    }

    pub fn into_entry(self) -> CatalogEntry {
        CatalogEntry {
            title: self.display_title(),
            native_title: self.title.and_then(|t| t.native),
            id: self.id,
            cover_url: self.cover_image.and_then(|c| c.large),
            episodes: self.episodes,
            mean_score: self.mean_score,
            season: self.season,
            season_year: self.season_year,
            genres: self.genres.unwrap_or_default(),
            format: self.format,
            status: self.status,
            next_episode: self.next_airing_episode.map(|n| n.episode),
        }
    }
}

impl AiringSchedule {
    /// `None` when the timestamp is out of range.
    pub fn into_episode(self) -> Option<AiringEpisode> {
        Some(AiringEpisode {
            airing_at: DateTime::from_timestamp(self.airing_at, 0)?,
            title: self.media.display_title(),
            media_id: self.media.id,
            episode: self.episode,
        })
    }
}

// ── Seasons ──────────────────────────────────────────────────────

/// AniList broadcast quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimeSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl AnimeSeason {
    /// Season and year containing `date`.
    pub fn of(date: NaiveDate) -> (Self, i32) {
        let season = match date.month() {
            1..=3 => Self::Winter,
            4..=6 => Self::Spring,
            7..=9 => Self::Summer,
            _ => Self::Fall,
        };
        (season, date.year())
    }

    pub fn as_graphql(self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }
}

impl fmt::Display for AnimeSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        };
        f.write_str(name)
    }
}
