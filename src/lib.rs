//! Core library surface for the Song Manager TUI, a terminal client for a
//! song catalogue served over HTTP.
//!
//! The `bin` target wires these pieces together; the modules stay public so
//! other tooling can reuse the API client or config loading on their own.
pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod ui;

/// The HTTP seam every screen fetches through.
pub use api::{ApiError, HttpSongApi, SongApi};

pub use config::{AppPaths, Config};

/// The domain types exchanged with the server.
pub use models::{Song, StatisticsSnapshot};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Route};
