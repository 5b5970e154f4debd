use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use reeldeck_core::models::MediaKind;

// ── Wire payloads ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawDetails {
    pub id: u64,
    /// Movies carry `title`, shows carry `name`.
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<RawSeasonSummary>,
    pub credits: Option<Credits>,
    pub videos: Option<Results<Video>>,
    #[serde(rename = "watch/providers")]
    pub watch_providers: Option<ProviderResults>,
    pub images: Option<Images>,
}

#[derive(Debug, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawSeasonSummary {
    pub season_number: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
    pub air_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<RawCast>,
    #[serde(default)]
    pub crew: Vec<RawCrew>,
}

#[derive(Debug, Deserialize)]
pub struct RawCast {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCrew {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Results<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub official: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProviderResults {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegionProviders {
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<RawProvider>,
    #[serde(default)]
    pub rent: Vec<RawProvider>,
    #[serde(default)]
    pub buy: Vec<RawProvider>,
}

#[derive(Debug, Deserialize)]
pub struct RawProvider {
    pub provider_name: String,
    pub logo_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub logos: Vec<ImageAsset>,
}

/// One entry of an `images.logos` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageAsset {
    pub file_path: String,
    pub iso_639_1: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawEpisode {
    pub season_number: u32,
    pub episode_number: u32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
    pub still_path: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct RawSeason {
    pub season_number: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub episodes: Vec<RawEpisode>,
}

#[derive(Debug, Deserialize)]
pub struct RawListItem {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct RawPerson {
    pub id: u64,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub known_for_department: Option<String>,
    pub profile_path: Option<String>,
    pub combined_credits: Option<RawCombinedCredits>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCombinedCredits {
    #[serde(default)]
    pub cast: Vec<RawPersonCredit>,
    #[serde(default)]
    pub crew: Vec<RawPersonCredit>,
}

#[derive(Debug, Deserialize)]
pub struct RawPersonCredit {
    pub id: u64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub character: Option<String>,
    pub job: Option<String>,
}

// ── Resolved records ────────────────────────────────────────────

/// Display-ready facts about a movie or show. Image fields are absolute URLs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsRecord {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub logo_url: Option<String>,
    /// Minutes; per-episode runtime for shows.
    pub runtime: Option<u32>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    pub genres: Vec<String>,
    pub season_count: Option<u32>,
    pub episode_count: Option<u32>,
    pub seasons: Vec<SeasonSummary>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub trailer_url: Option<String>,
    pub providers: Vec<StreamingProvider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub number: u32,
    pub name: Option<String>,
    pub episode_count: u32,
    pub air_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
}

/// A service offering the title by subscription in the configured region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamingProvider {
    pub name: String,
    pub logo_url: Option<String>,
    pub link: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeDetails {
    pub show_id: u64,
    pub season: u32,
    pub number: u32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
    pub still_url: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonDetails {
    pub show_id: u64,
    pub number: u32,
    pub name: Option<String>,
    pub episodes: Vec<EpisodeDetails>,
}

impl SeasonDetails {
    /// Total used to decide whether a season is fully watched.
    pub fn episode_count(&self) -> u32 {
        self.episodes.len() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarTitle {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub poster_url: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub known_for_department: Option<String>,
    pub profile_url: Option<String>,
    pub credits: Vec<PersonCredit>,
}

/// A title the person appeared in (`character`) or worked on (`job`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonCredit {
    pub id: u64,
    pub kind: Option<MediaKind>,
    pub title: String,
    pub character: Option<String>,
    pub job: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_show_details() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "episode_run_time": [45, 47],
            "number_of_seasons": 5,
            "seasons": [
                { "season_number": 0, "name": "Specials", "episode_count": 9 },
                { "season_number": 1, "name": "Season 1", "episode_count": 7, "air_date": "2008-01-20" }
            ],
            "watch/providers": {
                "results": {
                    "US": { "link": "https://www.themoviedb.org/tv/1396/watch", "flatrate": [
                        { "provider_name": "Netflix", "logo_path": "/netflix.jpg" }
                    ] }
                }
            }
        }"#;

        let raw: RawDetails = serde_json::from_str(json).unwrap();
        assert_eq!(raw.name.as_deref(), Some("Breaking Bad"));
        assert!(raw.title.is_none());
        assert_eq!(raw.seasons[1].episode_count, 7);
        let us = &raw.watch_providers.unwrap().results["US"];
        assert_eq!(us.flatrate[0].provider_name, "Netflix");
    }

    #[test]
    fn test_deserialize_person_credits() {
        let json = r#"{
            "id": 17419,
            "name": "Bryan Cranston",
            "combined_credits": {
                "cast": [ { "id": 1396, "media_type": "tv", "name": "Breaking Bad", "character": "Walter White" } ],
                "crew": [ { "id": 1396, "media_type": "tv", "name": "Breaking Bad", "job": "Director" } ]
            }
        }"#;

        let raw: RawPerson = serde_json::from_str(json).unwrap();
        let credits = raw.combined_credits.unwrap();
        assert_eq!(credits.cast[0].character.as_deref(), Some("Walter White"));
        assert_eq!(credits.crew[0].job.as_deref(), Some("Director"));
    }
}
