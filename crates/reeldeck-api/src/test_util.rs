//! Shared helpers for client tests.

/// Client that ignores proxy environment variables, so requests to the local
/// mock server are not routed elsewhere.
pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// An address nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";
