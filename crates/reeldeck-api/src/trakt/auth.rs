use std::io::{Read, Write};
use std::net::TcpListener;

use rand::distr::Alphanumeric;
use rand::Rng;
use url::Url;

use super::error::TraktError;

pub(crate) const AUTH_URL: &str = "https://trakt.tv/oauth/authorize";

pub const ACCESS_TOKEN_KEY: &str = "trakt_access_token";
pub const REFRESH_TOKEN_KEY: &str = "trakt_refresh_token";
pub const TOKEN_EXPIRES_KEY: &str = "trakt_token_expires_at";
pub const OAUTH_STATE_KEY: &str = "trakt_oauth_state";

/// Random anti-CSRF value for the authorize round trip.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build the consent page URL for the authorization-code grant.
pub fn authorize_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<String, TraktError> {
    let url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("state", state),
        ],
    )
    .map_err(|e| TraktError::Auth(format!("failed to build authorize URL: {e}")))?;
    Ok(url.into())
}

/// Wait on the redirect URI's port for the browser to come back from the
/// consent page and return its `(code, state)` query parameters.
///
/// Blocking; run it on a blocking thread.
pub fn listen_for_redirect(redirect_uri: &str) -> Result<(String, String), TraktError> {
    let redirect = Url::parse(redirect_uri)
        .map_err(|e| TraktError::Auth(format!("invalid redirect URI: {e}")))?;
    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| TraktError::Auth("redirect URI has no port".into()))?;

    let listener = TcpListener::bind(("127.0.0.1", port))
        .map_err(|e| TraktError::Auth(format!("failed to bind localhost:{port}: {e}")))?;

    tracing::info!(port, "Waiting for Trakt OAuth redirect");

    let (mut stream, _) = listener
        .accept()
        .map_err(|e| TraktError::Auth(format!("failed to accept connection: {e}")))?;

    let mut buf = [0u8; 4096];
    let n = stream
        .read(&mut buf)
        .map_err(|e| TraktError::Auth(format!("failed to read from stream: {e}")))?;
    let request = String::from_utf8_lossy(&buf[..n]);

    // "GET /callback?code=...&state=... HTTP/1.1"
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| TraktError::Auth("malformed HTTP request from redirect".into()))?;

    let (code, state) = parse_redirect(path)?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
                    <html><body><h2>Signed in to Trakt.</h2>\
                    <p>You can close this tab and return to reeldeck.</p></body></html>";
    let _ = stream.write_all(response.as_bytes());

    Ok((code, state))
}

/// Extract `code` and `state` from a redirect path such as `/callback?code=..&state=..`.
pub fn parse_redirect(path: &str) -> Result<(String, String), TraktError> {
    let parsed = Url::parse(&format!("http://localhost{path}"))
        .map_err(|e| TraktError::Auth(format!("failed to parse redirect URL: {e}")))?;

    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        return Err(TraktError::Auth(format!("authorization denied: {error}")));
    }
    let code = param("code").ok_or_else(|| TraktError::Auth("no 'code' parameter in redirect".into()))?;
    let state = param("state").unwrap_or_default();
    Ok((code, state))
}
