//! Ratatui front-end: the book table, the collapsible add-book panel, the
//! filter selector and the footer.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
