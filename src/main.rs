//! Binary entry point: resolve config, start file logging, point the HTTP
//! client at the configured server, and drive the Ratatui event loop.
use anyhow::Context;
use song_manager::logging::init_logging;
use song_manager::{run_app, App, AppPaths, Config, HttpSongApi};

/// Returning a `Result` surfaces fatal setup problems (an unreadable config
/// file, an invalid base URL) on the terminal instead of inside the TUI.
fn main() -> anyhow::Result<()> {
    let paths = AppPaths::detect()?;
    let config = Config::load(&paths)?;
    let _guard = init_logging(&paths.log_dir, &config.logging.filter)?;

    let api = HttpSongApi::new(&config.api.base_url, config.request_timeout())
        .with_context(|| format!("invalid API base URL {:?}", config.api.base_url))?;
    let api_label = api.base_url().to_string();

    let initial_path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    tracing::info!(api = %api_label, path = %initial_path, "starting song manager");

    let mut app = App::new(Box::new(api), api_label, &initial_path);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal session ended with an error");
    }
    result
}
