//! Ratatui front-end. A fixed shell (header links, footer notices) wraps one
//! routed view at a time: the song list at `/`, the editor at `/create` and
//! `/edit/:id`, and the statistics dashboard at `/statistics`.

mod app;
mod forms;
mod helpers;
mod router;
mod screens;
mod shell;
mod terminal;

pub use app::App;
pub use router::Route;
pub use terminal::run_app;
