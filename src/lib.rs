pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod store;
pub mod tracking;
pub mod utils;

pub use error::TrackError;
