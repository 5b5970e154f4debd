pub mod client;
pub mod error;
pub mod providers;
pub mod types;

pub use client::{select_logo, TmdbClient};
pub use error::ResolutionMiss;
pub use providers::provider_link;
