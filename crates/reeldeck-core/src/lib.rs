pub mod actions;
pub mod config;
pub mod error;
pub mod models;
pub mod status;
pub mod store;
pub mod sync;
pub mod traits;
