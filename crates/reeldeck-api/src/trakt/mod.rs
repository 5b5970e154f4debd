pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::TraktClient;
pub use error::TraktError;
