//! Core library surface for the Bookshelf TUI.
//!
//! The store and the view projection carry the rules; the `ui` module is the
//! terminal glue around them. The `bin` target wires the pieces together.
pub mod alert;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;
pub mod view;

/// Persistence entry points used by `main.rs` to open the slot store.
pub use db::{open_database, MemorySlots, SlotStore, SqliteSlots};

pub use config::Config;
pub use error::{LibraryError, ValidationError};
pub use models::{Book, BookId};
pub use store::{Library, LoadOrigin};
pub use view::{render, FilterMode, LibraryView};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
