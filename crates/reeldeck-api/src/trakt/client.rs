use chrono::{NaiveDate, Utc};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use reeldeck_core::config::TraktConfig;
use reeldeck_core::models::{MediaKind, WatchTarget, WatchedMovieEntry, WatchedShowEntry};
use reeldeck_core::store::SharedStore;
use reeldeck_core::traits::{WatchSource, WatchWriter};

use super::auth::{
    self, ACCESS_TOKEN_KEY, OAUTH_STATE_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRES_KEY,
};
use super::error::TraktError;
use super::types::{
    sync_body, CalendarEntry, HistoryItem, SyncResponse, TokenResponse, UserStats,
    WatchedMovieItem, WatchedShowItem, WatchlistItem,
};

const API_VERSION: &str = "2";

/// Trakt API v2 client.
///
/// Tokens and the OAuth state live in the shared store, so every client built
/// over the same store sees the same session.
pub struct TraktClient {
    config: TraktConfig,
    store: SharedStore,
    http: Client,
}

impl TraktClient {
    pub fn new(config: TraktConfig, store: SharedStore) -> Self {
        Self {
            config,
            store,
            http: Client::new(),
        }
    }

    /// Replace the underlying HTTP client.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    // ── Session ─────────────────────────────────────────────────

    /// True iff an access token is persisted. No network.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    fn access_token(&self) -> Option<String> {
        match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read Trakt access token");
                None
            }
        }
    }

    /// Build the consent page URL with a fresh `state`, persisting the state
    /// for [`exchange_code_for_token`](Self::exchange_code_for_token).
    pub fn auth_url(&self) -> Result<String, TraktError> {
        let state = auth::generate_state();
        let url = auth::authorize_url(&self.config.client_id, &self.config.redirect_uri, &state)?;
        self.store.set(OAUTH_STATE_KEY, &state)?;
        Ok(url)
    }

    /// Complete the authorization-code grant.
    ///
    /// `state` must match the value persisted by [`auth_url`](Self::auth_url).
    pub async fn exchange_code_for_token(&self, code: &str, state: &str) -> Result<(), TraktError> {
        let expected = self.store.get(OAUTH_STATE_KEY)?;
        if state.is_empty() || expected.as_deref() != Some(state) {
            tracing::warn!("Trakt OAuth state mismatch, rejecting callback");
            return Err(TraktError::Auth("invalid state".into()));
        }

        let token = self
            .token_request(serde_json::json!({
                "code": code,
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "redirect_uri": self.config.redirect_uri,
                "grant_type": "authorization_code",
            }))
            .await?;

        self.persist_token(&token)?;
        self.store.remove(OAUTH_STATE_KEY)?;
        tracing::info!("Signed in to Trakt");
        Ok(())
    }

    /// Trade the stored refresh token for a new token pair.
    pub async fn refresh_access_token(&self) -> Result<(), TraktError> {
        let refresh_token = self
            .store
            .get(REFRESH_TOKEN_KEY)?
            .ok_or_else(|| TraktError::Auth("no refresh token".into()))?;

        let token = self
            .token_request(serde_json::json!({
                "refresh_token": refresh_token,
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "redirect_uri": self.config.redirect_uri,
                "grant_type": "refresh_token",
            }))
            .await?;

        self.persist_token(&token)?;
        tracing::info!("Refreshed Trakt access token");
        Ok(())
    }

    /// True when the stored expiry has passed. An unknown expiry counts as fresh.
    pub fn token_expired(&self) -> bool {
        self.store
            .get(TOKEN_EXPIRES_KEY)
            .ok()
            .flatten()
            .and_then(|v| v.parse::<i64>().ok())
            .is_some_and(|expires_at| Utc::now().timestamp() >= expires_at)
    }

    /// Refresh the token pair if signed in and the access token has expired.
    pub async fn refresh_if_expired(&self) -> Result<(), TraktError> {
        if self.is_authenticated() && self.token_expired() {
            tracing::info!("Trakt access token expired, refreshing");
            self.refresh_access_token().await?;
        }
        Ok(())
    }

    /// Open the consent page in the browser, wait for the redirect on the
    /// configured redirect URI and exchange the code.
    pub async fn authorize(&self) -> Result<(), TraktError> {
        let url = self.auth_url()?;

        tracing::info!("Opening Trakt authorization URL in browser");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, %url, "Failed to open browser, open the URL manually");
        }

        let redirect_uri = self.config.redirect_uri.clone();
        let (code, state) = tokio::task::spawn_blocking(move || auth::listen_for_redirect(&redirect_uri))
            .await
            .map_err(|e| TraktError::Auth(format!("redirect listener failed: {e}")))??;

        self.exchange_code_for_token(&code, &state).await
    }

    /// Forget tokens and any pending OAuth state.
    pub fn logout(&self) -> Result<(), TraktError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(TOKEN_EXPIRES_KEY)?;
        self.store.remove(OAUTH_STATE_KEY)?;
        Ok(())
    }

    async fn token_request(&self, body: Value) -> Result<TokenResponse, TraktError> {
        let url = format!("{}/oauth/token", self.base_url());
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Trakt token request failed");
                TraktError::Auth("token exchange failed".into())
            })?;

        if !resp.status().is_success() {
            tracing::warn!(status = resp.status().as_u16(), "Trakt token request rejected");
            return Err(TraktError::Auth("token exchange failed".into()));
        }

        resp.json::<TokenResponse>().await.map_err(|e| {
            tracing::warn!(error = %e, "Unreadable Trakt token response");
            TraktError::Auth("token exchange failed".into())
        })
    }

    fn persist_token(&self, token: &TokenResponse) -> Result<(), TraktError> {
        self.store.set(ACCESS_TOKEN_KEY, &token.access_token)?;
        match &token.refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh)?,
            None => self.store.remove(REFRESH_TOKEN_KEY)?,
        }
        if let (Some(created), Some(expires_in)) = (token.created_at, token.expires_in) {
            self.store
                .set(TOKEN_EXPIRES_KEY, &(created + expires_in).to_string())?;
        }
        Ok(())
    }

    // ── Request primitive ───────────────────────────────────────

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Issue a request against the API. Adds the API version and key headers,
    /// plus the bearer token when signed in. Non-2xx responses become
    /// [`TraktError::Api`]; an empty 2xx body decodes as JSON `null`.
    pub async fn make_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, TraktError> {
        tracing::debug!(%method, endpoint, "Trakt request");

        let mut req = self
            .http
            .request(method.clone(), format!("{}{endpoint}", self.base_url()))
            .header("Content-Type", "application/json")
            .header("trakt-api-version", API_VERSION)
            .header("trakt-api-key", &self.config.client_id);
        if let Some(token) = self.access_token() {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let status = status.as_u16();
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(%method, endpoint, status, "Trakt API error");
            return Err(TraktError::Api { status, message });
        }

        let text = resp.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| TraktError::Parse(e.to_string()))
    }

    // ── Bulk reads used by the synchronizer ─────────────────────

    pub async fn get_watched_movies(&self) -> Result<Vec<WatchedMovieItem>, TraktError> {
        self.make_request(Method::GET, "/sync/watched/movies?extended=full", None)
            .await
    }

    pub async fn get_watched_shows(&self) -> Result<Vec<WatchedShowItem>, TraktError> {
        self.make_request(Method::GET, "/sync/watched/shows?extended=full", None)
            .await
    }

    // ── Domain operations ───────────────────────────────────────

    pub async fn add_to_watchlist(&self, target: &WatchTarget) -> Result<SyncResponse, TraktError> {
        let body = sync_body(target, None)?;
        self.write("/sync/watchlist", &body).await
    }

    pub async fn remove_from_watchlist(
        &self,
        target: &WatchTarget,
    ) -> Result<SyncResponse, TraktError> {
        let body = sync_body(target, None)?;
        self.write("/sync/watchlist/remove", &body).await
    }

    pub async fn mark_as_watched(&self, target: &WatchTarget) -> Result<SyncResponse, TraktError> {
        let body = sync_body(target, None)?;
        self.write("/sync/history", &body).await
    }

    pub async fn remove_from_watched(
        &self,
        target: &WatchTarget,
    ) -> Result<SyncResponse, TraktError> {
        let body = sync_body(target, None)?;
        self.write("/sync/history/remove", &body).await
    }

    /// Rate an item on Trakt's 1-10 scale.
    pub async fn rate_content(
        &self,
        target: &WatchTarget,
        rating: u8,
    ) -> Result<SyncResponse, TraktError> {
        if !(1..=10).contains(&rating) {
            return Err(TraktError::InvalidRating(rating));
        }
        let body = sync_body(target, Some(rating))?;
        self.write("/sync/ratings", &body).await
    }

    pub async fn follow_user(&self, username: &str) -> Result<(), TraktError> {
        let endpoint = format!("/users/{}/follow", user_segment(username)?);
        let _: Value = self.make_request(Method::POST, &endpoint, None).await?;
        Ok(())
    }

    pub async fn unfollow_user(&self, username: &str) -> Result<(), TraktError> {
        let endpoint = format!("/users/{}/follow", user_segment(username)?);
        let _: Value = self.make_request(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }

    pub async fn get_watchlist(&self) -> Result<Vec<WatchlistItem>, TraktError> {
        self.make_request(Method::GET, "/sync/watchlist?extended=full", None)
            .await
    }

    pub async fn get_history(&self, page: u32, limit: u32) -> Result<Vec<HistoryItem>, TraktError> {
        let endpoint = format!("/sync/history?page={}&limit={limit}", page.max(1));
        self.make_request(Method::GET, &endpoint, None).await
    }

    /// Stats for `username`, or the signed-in user when `username` is `"me"`.
    pub async fn get_stats(&self, username: &str) -> Result<UserStats, TraktError> {
        let endpoint = format!("/users/{}/stats", user_segment(username)?);
        self.make_request(Method::GET, &endpoint, None).await
    }

    /// The signed-in user's calendar: episodes airing (shows) or releases (movies).
    pub async fn get_calendar(
        &self,
        kind: MediaKind,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<CalendarEntry>, TraktError> {
        let endpoint = format!(
            "/calendars/my/{}/{}/{}",
            kind.trakt_plural(),
            start.format("%Y-%m-%d"),
            days.clamp(1, 33)
        );
        self.make_request(Method::GET, &endpoint, None).await
    }

    /// Calendar starting today.
    pub async fn get_upcoming(&self, kind: MediaKind, days: u32) -> Result<Vec<CalendarEntry>, TraktError> {
        self.get_calendar(kind, Utc::now().date_naive(), days).await
    }

    async fn write(&self, endpoint: &str, body: &Value) -> Result<SyncResponse, TraktError> {
        let resp: Option<SyncResponse> = self.make_request(Method::POST, endpoint, Some(body)).await?;
        Ok(resp.unwrap_or_default())
    }
}

fn user_segment(username: &str) -> Result<String, TraktError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(TraktError::InvalidRequest("username is empty".into()));
    }
    Ok(url::form_urlencoded::byte_serialize(username.as_bytes()).collect())
}

impl WatchSource for TraktClient {
    type Error = TraktError;

    fn is_authenticated(&self) -> bool {
        TraktClient::is_authenticated(self)
    }

    async fn watched_movies(&self) -> Result<Vec<WatchedMovieEntry>, TraktError> {
        let items = self.get_watched_movies().await?;
        Ok(items.into_iter().map(|i| i.into_entry()).collect())
    }

    async fn watched_shows(&self) -> Result<Vec<WatchedShowEntry>, TraktError> {
        let items = self.get_watched_shows().await?;
        Ok(items.into_iter().map(|i| i.into_entry()).collect())
    }
}

impl WatchWriter for TraktClient {
    async fn mark_watched(&self, target: &WatchTarget) -> Result<(), TraktError> {
        self.mark_as_watched(target).await.map(|_| ())
    }

    async fn unmark_watched(&self, target: &WatchTarget) -> Result<(), TraktError> {
        self.remove_from_watched(target).await.map(|_| ())
    }

    async fn add_to_watchlist(&self, target: &WatchTarget) -> Result<(), TraktError> {
        TraktClient::add_to_watchlist(self, target).await.map(|_| ())
    }

    async fn remove_from_watchlist(&self, target: &WatchTarget) -> Result<(), TraktError> {
        TraktClient::remove_from_watchlist(self, target).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::{Matcher, Server};
    use serde_json::json;

    use reeldeck_core::config::AppConfig;
    use reeldeck_core::models::MediaIds;
    use reeldeck_core::store::{KeyValueStore, MemoryStore};
    use reeldeck_core::sync::Synchronizer;

    use super::*;
    use crate::test_util::{http, UNREACHABLE};

    fn client(base_url: &str) -> (TraktClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut config = AppConfig::default().trakt;
        config.client_id = "cid".into();
        config.client_secret = "secret".into();
        config.base_url = base_url.into();
        let client = TraktClient::new(config, store.clone()).with_http_client(http());
        (client, store)
    }

    fn state_from(url: &str) -> String {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn test_is_authenticated_reads_store() {
        let (client, store) = client(UNREACHABLE);
        assert!(!client.is_authenticated());
        store.set(ACCESS_TOKEN_KEY, "tok").unwrap();
        assert!(client.is_authenticated());
        client.logout().unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_auth_url_persists_fresh_state() {
        let (client, store) = client(UNREACHABLE);
        let first = client.auth_url().unwrap();
        let second = client.auth_url().unwrap();

        assert_ne!(state_from(&first), state_from(&second));
        assert_eq!(
            store.get(OAUTH_STATE_KEY).unwrap(),
            Some(state_from(&second))
        );
    }

    #[tokio::test]
    async fn test_state_mismatch_is_rejected() {
        let (client, store) = client(UNREACHABLE);
        store.set(OAUTH_STATE_KEY, "abc").unwrap();

        let err = client.exchange_code_for_token("code", "xyz").await.unwrap_err();
        assert!(matches!(err, TraktError::Auth(ref m) if m == "invalid state"));
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(REFRESH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_stored_state_is_rejected() {
        let (client, _) = client(UNREACHABLE);
        let err = client.exchange_code_for_token("code", "").await.unwrap_err();
        assert!(matches!(err, TraktError::Auth(_)));
    }

    #[tokio::test]
    async fn test_exchange_persists_tokens_and_clears_state() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "code": "code",
                "client_id": "cid",
                "client_secret": "secret",
                "grant_type": "authorization_code",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"at","refresh_token":"rt","expires_in":7776000,"created_at":1700000000,"token_type":"bearer","scope":"public"}"#,
            )
            .create_async()
            .await;
        let (client, store) = client(&server.url());
        let state = state_from(&client.auth_url().unwrap());

        client.exchange_code_for_token("code", &state).await.unwrap();

        token.assert_async().await;
        assert!(client.is_authenticated());
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("rt"));
        assert_eq!(
            store.get(TOKEN_EXPIRES_KEY).unwrap().as_deref(),
            Some("1707776000")
        );
        assert!(store.get(OAUTH_STATE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_auth_error() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;
        let (client, store) = client(&server.url());
        let state = state_from(&client.auth_url().unwrap());

        let err = client.exchange_code_for_token("code", &state).await.unwrap_err();
        assert!(matches!(err, TraktError::Auth(ref m) if m == "token exchange failed"));
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_exchange_is_auth_error() {
        let (client, _) = client(UNREACHABLE);
        let state = state_from(&client.auth_url().unwrap());
        let err = client.exchange_code_for_token("code", &state).await.unwrap_err();
        assert!(matches!(err, TraktError::Auth(_)));
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "refresh_token",
                "refresh_token": "rt1",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"new","refresh_token":"rt2","expires_in":7776000,"created_at":1700000000}"#,
            )
            .create_async()
            .await;
        let (client, store) = client(&server.url());
        store.set(ACCESS_TOKEN_KEY, "old").unwrap();
        store.set(REFRESH_TOKEN_KEY, "rt1").unwrap();
        store.set(TOKEN_EXPIRES_KEY, "1000").unwrap();
        assert!(client.token_expired());

        client.refresh_if_expired().await.unwrap();

        refresh.assert_async().await;
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("new"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("rt2"));
        assert!(!client.token_expired());
    }

    #[tokio::test]
    async fn test_fresh_token_is_not_refreshed() {
        let (client, store) = client(UNREACHABLE);
        store.set(ACCESS_TOKEN_KEY, "tok").unwrap();
        client.refresh_if_expired().await.unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_make_request_attaches_headers() {
        let mut server = Server::new_async().await;
        let watched = server
            .mock("GET", "/sync/watched/movies")
            .match_query(Matcher::UrlEncoded("extended".into(), "full".into()))
            .match_header("trakt-api-version", "2")
            .match_header("trakt-api-key", "cid")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let (client, store) = client(&server.url());
        store.set(ACCESS_TOKEN_KEY, "tok").unwrap();

        let movies = client.get_watched_movies().await.unwrap();

        watched.assert_async().await;
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_make_request_without_token_omits_bearer() {
        let mut server = Server::new_async().await;
        let stats = server
            .mock("GET", "/users/me/stats")
            .match_header("trakt-api-key", "cid")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let (client, _) = client(&server.url());

        let _: Value = client.make_request(Method::GET, "/users/me/stats", None).await.unwrap();
        stats.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_api_error() {
        let mut server = Server::new_async().await;
        let _shows = server
            .mock("GET", "/sync/watched/shows")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;
        let (client, _) = client(&server.url());

        let err = client.get_watched_shows().await.unwrap_err();
        assert!(matches!(err, TraktError::Api { status: 401, .. }));
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let mut server = Server::new_async().await;
        let unfollow = server
            .mock("DELETE", "/users/sean/follow")
            .with_status(204)
            .create_async()
            .await;
        let (client, _) = client(&server.url());

        client.unfollow_user("sean").await.unwrap();
        unfollow.assert_async().await;
    }

    #[tokio::test]
    async fn test_writes_are_validated_before_sending() {
        let (client, _) = client(UNREACHABLE);
        let movie = WatchTarget::Movie(MediaIds::new(Some(432), Some(550)));
        let no_trakt = WatchTarget::Movie(MediaIds::new(None, Some(550)));

        assert!(matches!(
            client.rate_content(&movie, 11).await,
            Err(TraktError::InvalidRating(11))
        ));
        assert!(matches!(
            client.rate_content(&movie, 0).await,
            Err(TraktError::InvalidRating(0))
        ));
        assert!(matches!(
            client.mark_as_watched(&no_trakt).await,
            Err(TraktError::MissingId)
        ));
        assert!(matches!(
            client.follow_user("  ").await,
            Err(TraktError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_add_to_watchlist_posts_body() {
        let mut server = Server::new_async().await;
        let watchlist = server
            .mock("POST", "/sync/watchlist")
            .match_body(Matcher::Json(json!({"movies": [{"ids": {"trakt": 432}}]})))
            .with_status(201)
            .with_body(r#"{"added":{"movies":1}}"#)
            .create_async()
            .await;
        let (client, _) = client(&server.url());
        let movie = WatchTarget::Movie(MediaIds::new(Some(432), Some(550)));

        let resp = TraktClient::add_to_watchlist(&client, &movie).await.unwrap();

        watchlist.assert_async().await;
        assert_eq!(resp.added.unwrap().movies, 1);
    }

    #[tokio::test]
    async fn test_sync_over_http() {
        let mut server = Server::new_async().await;
        let movies = server
            .mock("GET", "/sync/watched/movies")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"[{"plays":3,"last_watched_at":"2024-03-01T20:15:00.000Z",
                     "movie":{"title":"Fight Club","ids":{"trakt":432,"tmdb":550}}},
                    {"plays":1,"last_watched_at":null,
                     "movie":{"title":"Unknown","ids":{"trakt":9}}}]"#,
            )
            .create_async()
            .await;
        let shows = server
            .mock("GET", "/sync/watched/shows")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"[{"plays":3,"last_watched_at":null,
                     "show":{"title":"Show","ids":{"trakt":1,"tmdb":100}},
                     "seasons":[{"number":1,"episodes":[
                        {"number":1,"plays":1,"last_watched_at":null},
                        {"number":2,"plays":1,"last_watched_at":null},
                        {"number":3,"plays":1,"last_watched_at":null}]}]}]"#,
            )
            .create_async()
            .await;
        let (client, store) = client(&server.url());
        store.set(ACCESS_TOKEN_KEY, "tok").unwrap();

        let sync = Synchronizer::new(client, store.clone());
        let result = sync.sync().await.unwrap();

        movies.assert_async().await;
        shows.assert_async().await;
        assert_eq!(result.skipped, 1);
        assert!(result.state.is_movie_watched(550));
        assert_eq!(result.state.movie_watch_count(550), 3);
        assert!(result.state.is_season_fully_watched(100, 1, 3));
        assert!(!result.state.is_season_fully_watched(100, 1, 4));
    }
}
