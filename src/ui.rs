//! Ratatui front-end. `app` owns state and rendering, `forms` and `screens`
//! hold per-mode and per-view state, and `terminal` drives the event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
