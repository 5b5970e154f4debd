use chrono::{Duration, Utc};
use reqwest::Client;

use reeldeck_core::config::CatalogConfig;

use super::error::AniListError;
use super::types::{AiringEpisode, AnimeSeason, CatalogEntry, GraphQLResponse, PageData, PageResponse};

const MEDIA_FIELDS: &str = r#"
    id
    title { romaji english native }
    episodes
    coverImage { large }
    meanScore
    season
    seasonYear
    genres
    format
    status
    nextAiringEpisode { episode airingAt }
"#;

const TRENDING_QUERY: &str = r#"
query ($page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        media(type: ANIME, sort: TRENDING_DESC, isAdult: false) { ...fields }
    }
}
"#;

const SEASON_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int, $perPage: Int) {
    Page(page: 1, perPage: $perPage) {
        media(season: $season, seasonYear: $seasonYear, type: ANIME, sort: POPULARITY_DESC, isAdult: false) { ...fields }
    }
}
"#;

const SEARCH_QUERY: &str = r#"
query ($search: String, $perPage: Int) {
    Page(page: 1, perPage: $perPage) {
        media(search: $search, type: ANIME, sort: SEARCH_MATCH, isAdult: false) { ...fields }
    }
}
"#;

const AIRING_QUERY: &str = r#"
query ($from: Int, $to: Int, $perPage: Int) {
    Page(page: 1, perPage: $perPage) {
        airingSchedules(airingAt_greater: $from, airingAt_lesser: $to, sort: TIME) {
            episode
            airingAt
            media { ...fields }
        }
    }
}
"#;

/// Read-only AniList catalog client. No authentication.
///
/// Every public call degrades to an empty list on failure so feeds render
/// "no results" instead of erroring.
pub struct AniListClient {
    config: CatalogConfig,
    http: Client,
}

impl AniListClient {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AniListError> {
        tracing::debug!(operation, "AniList GraphQL request");

        let query = format!("{query}\nfragment fields on Media {{{MEDIA_FIELDS}}}");
        let resp = self
            .http
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "AniList API error");
            return Err(AniListError::Api {
                status: status_code,
                message: body,
            });
        }

        let body: GraphQLResponse<T> = resp
            .json()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))?;

        if let Some(first) = body.errors.into_iter().next() {
            return Err(AniListError::GraphQL(first.message));
        }
        body.data
            .ok_or_else(|| AniListError::Parse("response has no data".into()))
    }

    async fn page(&self, operation: &str, query: &str, mut variables: serde_json::Value) -> Option<PageData> {
        if !self.config.enabled {
            return None;
        }
        variables["perPage"] = self.config.page_size.into();

        match self
            .graphql_request::<PageResponse>(operation, query, variables)
            .await
        {
            Ok(resp) => Some(resp.page),
            Err(e) => {
                tracing::warn!(operation, error = %e, "AniList request failed, showing no results");
                None
            }
        }
    }

    async fn media(&self, operation: &str, query: &str, variables: serde_json::Value) -> Vec<CatalogEntry> {
        self.page(operation, query, variables)
            .await
            .into_iter()
            .flat_map(|page| page.media)
            .map(|m| m.into_entry())
            .collect()
    }

    /// Currently trending anime.
    pub async fn trending(&self, page: u32) -> Vec<CatalogEntry> {
        self.media(
            "Trending",
            TRENDING_QUERY,
            serde_json::json!({ "page": page.max(1) }),
        )
        .await
    }

    /// Most popular anime of the current broadcast season.
    pub async fn popular_this_season(&self) -> Vec<CatalogEntry> {
        let (season, year) = AnimeSeason::of(Utc::now().date_naive());
        self.popular_in_season(season, year).await
    }

    pub async fn popular_in_season(&self, season: AnimeSeason, year: i32) -> Vec<CatalogEntry> {
        self.media(
            "SeasonPopular",
            SEASON_QUERY,
            serde_json::json!({ "season": season.as_graphql(), "seasonYear": year }),
        )
        .await
    }

    pub async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.media("Search", SEARCH_QUERY, serde_json::json!({ "search": query }))
            .await
    }

    /// Episodes airing from now through the next `days` days, soonest first.
    pub async fn airing_schedule(&self, days: u32) -> Vec<AiringEpisode> {
        let from = Utc::now();
        let to = from + Duration::days(i64::from(days.max(1)));
        self.page(
            "AiringSchedule",
            AIRING_QUERY,
            serde_json::json!({ "from": from.timestamp(), "to": to.timestamp() }),
        )
        .await
        .into_iter()
        .flat_map(|page| page.airing_schedules)
        .filter_map(|s| s.into_episode())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use reeldeck_core::config::AppConfig;
    use serde_json::json;

    use super::*;
    use crate::test_util::{http, UNREACHABLE};

    fn client(endpoint: &str) -> AniListClient {
        let mut config = AppConfig::default().catalog;
        config.endpoint = endpoint.into();
        config.page_size = 5;
        AniListClient::new(config).with_http_client(http())
    }

    async fn graphql(server: &mut ServerGuard, body: Matcher, response: &str) -> Mock {
        server
            .mock("POST", "/graphql")
            .match_header("content-type", "application/json")
            .match_body(body)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_empty() {
        let client = client(UNREACHABLE);
        assert!(client.trending(1).await.is_empty());
        assert!(client.search("bebop").await.is_empty());
        assert!(client.airing_schedule(7).await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_catalog_returns_empty() {
        let mut config = AppConfig::default().catalog;
        config.enabled = false;
        config.endpoint = UNREACHABLE.into();
        let client = AniListClient::new(config).with_http_client(http());
        assert!(client.popular_this_season().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_parses_page() {
        let mut server = Server::new_async().await;
        let search = graphql(
            &mut server,
            Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "variables": { "search": "bebop", "perPage": 5 } })),
                Matcher::Regex("fragment fields on Media".into()),
            ]),
            r#"{ "data": { "Page": { "media": [
                { "id": 1, "title": { "romaji": "Cowboy Bebop", "english": "Cowboy Bebop" },
                  "episodes": 26, "meanScore": 86, "format": "TV" }
            ] } } }"#,
        )
        .await;
        let results = client(&format!("{}/graphql", server.url()))
            .search("  bebop ")
            .await;

        search.assert_async().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].mean_score, Some(86));
    }

    #[tokio::test]
    async fn test_graphql_errors_return_empty() {
        let mut server = Server::new_async().await;
        let _trending = graphql(
            &mut server,
            Matcher::Any,
            r#"{ "data": null, "errors": [{ "message": "Too Many Requests", "status": 429 }] }"#,
        )
        .await;
        assert!(client(&format!("{}/graphql", server.url()))
            .trending(1)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_http_error_returns_empty() {
        let mut server = Server::new_async().await;
        let _down = server
            .mock("POST", "/graphql")
            .with_status(503)
            .create_async()
            .await;
        assert!(client(&format!("{}/graphql", server.url()))
            .popular_this_season()
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_airing_schedule_parses_episodes() {
        let mut server = Server::new_async().await;
        let _airing = graphql(
            &mut server,
            Matcher::Regex("airingSchedules".into()),
            r#"{ "data": { "Page": { "airingSchedules": [
                { "episode": 4, "airingAt": 1700000000,
                  "media": { "id": 154587, "title": { "romaji": "Sousou no Frieren", "english": "Frieren: Beyond Journey's End" } } }
            ] } } }"#,
        )
        .await;
        let airing = client(&format!("{}/graphql", server.url()))
            .airing_schedule(7)
            .await;

        assert_eq!(airing.len(), 1);
        assert_eq!(airing[0].episode, 4);
        assert_eq!(airing[0].title, "Frieren: Beyond Journey's End");
        assert_eq!(airing[0].airing_at.timestamp(), 1_700_000_000);
    }
}
