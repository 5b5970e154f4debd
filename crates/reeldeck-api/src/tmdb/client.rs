use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use reeldeck_core::config::TmdbConfig;
use reeldeck_core::models::MediaKind;

use super::error::ResolutionMiss;
use super::providers::provider_link;
use super::types::{
    CastMember, CrewMember, DetailsRecord, EpisodeDetails, ImageAsset, PersonCredit,
    PersonDetails, RawDetails, RawEpisode, RawListItem, RawPerson, RawSeason, Results,
    SeasonDetails, SeasonSummary, SimilarTitle, StreamingProvider, Video,
};

const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "original";
const LOGO_SIZE: &str = "w500";
const STILL_SIZE: &str = "w300";
const PROFILE_SIZE: &str = "w185";
const PROVIDER_LOGO_SIZE: &str = "w92";

const CAST_LIMIT: usize = 20;

/// TMDB v3 client. Every lookup either resolves or reports a
/// [`ResolutionMiss`]; nothing here is fatal to the caller.
pub struct TmdbClient {
    config: TmdbConfig,
    http: Client,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ResolutionMiss> {
        if self.config.api_key.is_empty() {
            return Err(ResolutionMiss::Unavailable("no TMDB API key configured".into()));
        }

        tracing::debug!(endpoint, "TMDB request");

        let url = format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint, error = %e, "TMDB request failed");
                ResolutionMiss::from(e)
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(endpoint, "TMDB has no such resource");
            return Err(ResolutionMiss::NotFound);
        }
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "TMDB API error");
            return Err(ResolutionMiss::Unavailable(format!("status {}", status.as_u16())));
        }

        resp.json::<T>().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "Unreadable TMDB response");
            ResolutionMiss::Unavailable(e.to_string())
        })
    }

    fn image_url(&self, size: &str, path: Option<&str>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        Some(format!(
            "{}/{size}{path}",
            self.config.image_base_url.trim_end_matches('/')
        ))
    }

    /// Resolve a movie or show with credits, videos and watch providers
    /// appended. `include_banner` also requests the logo images.
    pub async fn get_details(
        &self,
        kind: MediaKind,
        id: u64,
        include_banner: bool,
    ) -> Result<DetailsRecord, ResolutionMiss> {
        let mut append = String::from("credits,videos,watch/providers");
        let image_languages = format!("{},null", self.config.logo_language);
        let mut params = Vec::new();
        if include_banner {
            append.push_str(",images");
            params.push(("include_image_language", image_languages.as_str()));
        }
        params.push(("append_to_response", append.as_str()));

        let endpoint = format!("/{}/{id}", kind.tmdb_path());
        let raw: RawDetails = self.get_json(&endpoint, &params).await?;
        Ok(self.details_record(kind, raw))
    }

    fn details_record(&self, kind: MediaKind, raw: RawDetails) -> DetailsRecord {
        let title = raw.title.or(raw.name).unwrap_or_default();

        let logo_url = raw
            .images
            .as_ref()
            .and_then(|images| select_logo(&images.logos, &self.config.logo_language))
            .and_then(|path| self.image_url(LOGO_SIZE, Some(&path)));

        let trailer_url = raw.videos.and_then(|videos| {
            let youtube = |v: &&Video| v.site == "YouTube" && v.kind == "Trailer";
            videos
                .results
                .iter()
                .filter(youtube)
                .find(|v| v.official)
                .or_else(|| videos.results.iter().find(youtube))
                .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
        });

        let providers = raw
            .watch_providers
            .and_then(|mut p| p.results.remove(&self.config.region))
            .map(|region| {
                region
                    .flatrate
                    .into_iter()
                    .map(|p| StreamingProvider {
                        link: provider_link(&p.provider_name),
                        logo_url: self.image_url(PROVIDER_LOGO_SIZE, p.logo_path.as_deref()),
                        name: p.provider_name,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let credits = raw.credits.unwrap_or_default();

        DetailsRecord {
            id: raw.id,
            kind,
            title,
            overview: raw.overview.filter(|o| !o.is_empty()),
            poster_url: self.image_url(POSTER_SIZE, raw.poster_path.as_deref()),
            backdrop_url: self.image_url(BACKDROP_SIZE, raw.backdrop_path.as_deref()),
            logo_url,
            runtime: raw.runtime.or_else(|| raw.episode_run_time.first().copied()),
            release_date: raw.release_date.or(raw.first_air_date),
            vote_average: raw.vote_average,
            genres: raw.genres.into_iter().map(|g| g.name).collect(),
            season_count: raw.number_of_seasons,
            episode_count: raw.number_of_episodes,
            seasons: raw
                .seasons
                .into_iter()
                .map(|s| SeasonSummary {
                    number: s.season_number,
                    name: s.name,
                    episode_count: s.episode_count,
                    air_date: s.air_date,
                })
                .collect(),
            cast: credits
                .cast
                .into_iter()
                .take(CAST_LIMIT)
                .map(|c| CastMember {
                    profile_url: self.image_url(PROFILE_SIZE, c.profile_path.as_deref()),
                    id: c.id,
                    name: c.name,
                    character: c.character,
                })
                .collect(),
            crew: credits
                .crew
                .into_iter()
                .map(|c| CrewMember {
                    id: c.id,
                    name: c.name,
                    job: c.job,
                    department: c.department,
                })
                .collect(),
            trailer_url,
            providers,
        }
    }

    pub async fn get_episode_details(
        &self,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<EpisodeDetails, ResolutionMiss> {
        let endpoint = format!("/tv/{show_id}/season/{season}/episode/{episode}");
        let raw: RawEpisode = self.get_json(&endpoint, &[]).await?;
        Ok(self.episode_details(show_id, raw))
    }

    fn episode_details(&self, show_id: u64, raw: RawEpisode) -> EpisodeDetails {
        EpisodeDetails {
            show_id,
            season: raw.season_number,
            number: raw.episode_number,
            name: raw.name,
            overview: raw.overview.filter(|o| !o.is_empty()),
            air_date: raw.air_date,
            runtime: raw.runtime,
            still_url: self.image_url(STILL_SIZE, raw.still_path.as_deref()),
            vote_average: raw.vote_average,
        }
    }

    /// A season with its full episode list.
    pub async fn get_season(&self, show_id: u64, season: u32) -> Result<SeasonDetails, ResolutionMiss> {
        let endpoint = format!("/tv/{show_id}/season/{season}");
        let raw: RawSeason = self.get_json(&endpoint, &[]).await?;
        Ok(SeasonDetails {
            show_id,
            number: raw.season_number,
            name: raw.name,
            episodes: raw
                .episodes
                .into_iter()
                .map(|ep| self.episode_details(show_id, ep))
                .collect(),
        })
    }

    /// Titles TMDB considers similar. An empty list resolves as `NotFound`.
    pub async fn get_similar(&self, kind: MediaKind, id: u64) -> Result<Vec<SimilarTitle>, ResolutionMiss> {
        let endpoint = format!("/{}/{id}/similar", kind.tmdb_path());
        let raw: Results<RawListItem> = self.get_json(&endpoint, &[]).await?;
        if raw.results.is_empty() {
            return Err(ResolutionMiss::NotFound);
        }
        Ok(raw
            .results
            .into_iter()
            .map(|item| SimilarTitle {
                id: item.id,
                kind,
                title: item.title.or(item.name).unwrap_or_default(),
                poster_url: self.image_url(POSTER_SIZE, item.poster_path.as_deref()),
                vote_average: item.vote_average,
            })
            .collect())
    }

    /// A person with their combined movie and TV credits.
    pub async fn get_person(&self, id: u64) -> Result<PersonDetails, ResolutionMiss> {
        let endpoint = format!("/person/{id}");
        let raw: RawPerson = self
            .get_json(&endpoint, &[("append_to_response", "combined_credits")])
            .await?;

        let combined = raw.combined_credits.unwrap_or_default();
        let credits = combined
            .cast
            .into_iter()
            .chain(combined.crew)
            .map(|c| PersonCredit {
                id: c.id,
                kind: match c.media_type.as_deref() {
                    Some("movie") => Some(MediaKind::Movie),
                    Some("tv") => Some(MediaKind::Show),
                    _ => None,
                },
                title: c.title.or(c.name).unwrap_or_default(),
                character: c.character,
                job: c.job,
            })
            .collect();

        Ok(PersonDetails {
            id: raw.id,
            name: raw.name,
            biography: raw.biography.filter(|b| !b.is_empty()),
            birthday: raw.birthday,
            known_for_department: raw.known_for_department,
            profile_url: self.image_url(PROFILE_SIZE, raw.profile_path.as_deref()),
            credits,
        })
    }
}

/// Pick a logo: first one tagged `preferred_language`, else the first one.
pub fn select_logo(logos: &[ImageAsset], preferred_language: &str) -> Option<String> {
    logos
        .iter()
        .find(|logo| logo.iso_639_1.as_deref() == Some(preferred_language))
        .or_else(|| logos.first())
        .map(|logo| logo.file_path.clone())
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use reeldeck_core::config::AppConfig;

    use super::*;
    use crate::test_util::{http, UNREACHABLE};

    /// Mock a keyed GET on `path` answering `status` with `body`.
    async fn respond(server: &mut ServerGuard, path: &str, status: usize, body: &str) -> Mock {
        server
            .mock("GET", path)
            .match_query(Matcher::UrlEncoded("api_key".into(), "key".into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    fn client(base_url: &str) -> TmdbClient {
        let mut config = AppConfig::default().tmdb;
        config.api_key = "key".into();
        config.base_url = base_url.into();
        config.image_base_url = "https://img.test/t/p".into();
        TmdbClient::new(config).with_http_client(http())
    }

    fn logo(path: &str, lang: Option<&str>) -> ImageAsset {
        ImageAsset {
            file_path: path.into(),
            iso_639_1: lang.map(String::from),
        }
    }

    const MOVIE: &str = r#"{
        "id": 550,
        "title": "Fight Club",
        "overview": "An insomniac office worker...",
        "poster_path": "/poster.jpg",
        "backdrop_path": "/backdrop.jpg",
        "runtime": 139,
        "release_date": "1999-10-15",
        "genres": [{ "id": 18, "name": "Drama" }],
        "credits": {
            "cast": [{ "id": 819, "name": "Edward Norton", "character": "The Narrator", "profile_path": "/norton.jpg" }],
            "crew": [{ "id": 7467, "name": "David Fincher", "job": "Director", "department": "Directing" }]
        },
        "videos": { "results": [
            { "key": "teaser", "site": "YouTube", "type": "Teaser", "official": true },
            { "key": "fan", "site": "YouTube", "type": "Trailer", "official": false },
            { "key": "real", "site": "YouTube", "type": "Trailer", "official": true }
        ] },
        "watch/providers": { "results": {
            "US": { "flatrate": [{ "provider_name": "Hulu", "logo_path": "/hulu.jpg" }] },
            "DE": { "flatrate": [{ "provider_name": "Netflix", "logo_path": "/nf.jpg" }] }
        } },
        "images": { "logos": [
            { "file_path": "/de.png", "iso_639_1": "de" },
            { "file_path": "/en.png", "iso_639_1": "en" }
        ] }
    }"#;

    #[test]
    fn test_select_logo_prefers_language() {
        let logos = vec![logo("/de.png", Some("de")), logo("/en.png", Some("en"))];
        assert_eq!(select_logo(&logos, "en").as_deref(), Some("/en.png"));
    }

    #[test]
    fn test_select_logo_falls_back_to_first() {
        let logos = vec![logo("/null.png", None), logo("/de.png", Some("de"))];
        assert_eq!(select_logo(&logos, "en").as_deref(), Some("/null.png"));
        assert_eq!(select_logo(&[], "en"), None);
    }

    #[tokio::test]
    async fn test_get_details_resolves_record() {
        let mut server = Server::new_async().await;
        let movie = server
            .mock("GET", "/movie/550")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "key".into()),
                Matcher::UrlEncoded(
                    "append_to_response".into(),
                    "credits,videos,watch/providers,images".into(),
                ),
                Matcher::UrlEncoded("include_image_language".into(), "en,null".into()),
            ]))
            .with_status(200)
            .with_body(MOVIE)
            .create_async()
            .await;
        let details = client(&server.url())
            .get_details(MediaKind::Movie, 550, true)
            .await
            .unwrap();

        movie.assert_async().await;

        assert_eq!(details.title, "Fight Club");
        assert_eq!(details.runtime, Some(139));
        assert_eq!(details.poster_url.as_deref(), Some("https://img.test/t/p/w500/poster.jpg"));
        assert_eq!(details.logo_url.as_deref(), Some("https://img.test/t/p/w500/en.png"));
        assert_eq!(details.genres, vec!["Drama"]);
        assert_eq!(details.cast[0].character.as_deref(), Some("The Narrator"));
        assert_eq!(
            details.trailer_url.as_deref(),
            Some("https://www.youtube.com/watch?v=real")
        );
        assert_eq!(details.providers.len(), 1);
        assert_eq!(details.providers[0].link, Some("https://www.hulu.com"));
    }

    #[tokio::test]
    async fn test_show_runtime_uses_episode_run_time() {
        let mut server = Server::new_async().await;
        let _mock = respond(
            &mut server,
            "/tv/1396",
            200,
            r#"{ "id": 1396, "name": "Breaking Bad", "episode_run_time": [47] }"#,
        )
        .await;
        let details = client(&server.url())
            .get_details(MediaKind::Show, 1396, false)
            .await
            .unwrap();

        assert_eq!(details.title, "Breaking Bad");
        assert_eq!(details.runtime, Some(47));
        assert!(details.logo_url.is_none());
        assert!(details.providers.is_empty());
    }

    #[tokio::test]
    async fn test_missing_title_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = respond(&mut server, "/movie/1", 404, r#"{"status_code":34}"#).await;
        let err = client(&server.url())
            .get_details(MediaKind::Movie, 1, false)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionMiss::NotFound);
    }

    #[tokio::test]
    async fn test_unreachable_is_unavailable() {
        let err = client(UNREACHABLE)
            .get_episode_details(1396, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionMiss::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_garbage_body_is_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = respond(&mut server, "/person/17419", 200, "<html>").await;
        let err = client(&server.url()).get_person(17419).await.unwrap_err();
        assert!(matches!(err, ResolutionMiss::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let mut config = AppConfig::default().tmdb;
        config.base_url = UNREACHABLE.into();
        let err = TmdbClient::new(config)
            .get_details(MediaKind::Movie, 550, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionMiss::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_get_season_counts_episodes() {
        let mut server = Server::new_async().await;
        let season_mock = respond(
            &mut server,
            "/tv/1396/season/1",
            200,
            r#"{ "season_number": 1, "name": "Season 1", "episodes": [
                { "season_number": 1, "episode_number": 1, "name": "Pilot", "still_path": "/s1.jpg" },
                { "season_number": 1, "episode_number": 2, "name": "Cat's in the Bag..." }
            ] }"#,
        )
        .await;
        let season = client(&server.url()).get_season(1396, 1).await.unwrap();

        season_mock.assert_async().await;
        assert_eq!(season.episode_count(), 2);
        assert_eq!(season.episodes[0].show_id, 1396);
        assert_eq!(
            season.episodes[0].still_url.as_deref(),
            Some("https://img.test/t/p/w300/s1.jpg")
        );
    }

    #[tokio::test]
    async fn test_empty_similar_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = respond(&mut server, "/movie/550/similar", 200, r#"{ "page": 1, "results": [] }"#).await;
        let err = client(&server.url())
            .get_similar(MediaKind::Movie, 550)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionMiss::NotFound);
    }
}
