//! Typed access to the external song REST API.

/// Log the outcome of an API call under a fixed operation name.
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}

mod client;
mod error;
mod songs;
mod worker;

pub use client::HttpSongApi;
pub use error::ApiError;
pub use worker::{ApiRequest, ApiResponse, ApiWorker, Completion, Ticket};

use crate::models::{Song, StatisticsSnapshot};

/// The six operations the UI needs from the server. Screens only ever talk to
/// this trait so they can run against an in-memory fake in tests.
pub trait SongApi {
    fn list_songs(&self) -> Result<Vec<Song>, ApiError>;
    fn get_song(&self, id: &str) -> Result<Song, ApiError>;
    fn create_song(&self, song: &Song) -> Result<Song, ApiError>;
    fn update_song(&self, id: &str, song: &Song) -> Result<Song, ApiError>;
    fn delete_song(&self, id: &str) -> Result<(), ApiError>;
    fn statistics(&self) -> Result<StatisticsSnapshot, ApiError>;
}
