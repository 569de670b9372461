//! Binary entry point: read the config, open the slot database, hydrate the
//! library and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use bookshelf::{logging, open_database, run_app, App, Config, Library, SqliteSlots};
use tracing::info;

/// Fatal start-up problems (an unwritable data directory, a corrupt database
/// file) bubble up to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;
    info!(data_dir = %config.data_dir().display(), "starting bookshelf");

    let conn = open_database(&config.db_path())?;
    let library =
        Library::load(Box::new(SqliteSlots::new(conn))).context("failed to load library")?;

    let mut app = App::new(library, config.initial_filter, config.alert_ttl);
    let result = run_app(&mut app);
    info!("bookshelf closed");
    result
}
