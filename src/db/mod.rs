//! Persistence module: the SQLite connection plus the named-slot store the
//! library is serialized into.

mod connection;
mod slots;

pub use connection::{ensure_schema, open_database};
pub use slots::{MemorySlots, SlotStore, SqliteSlots, LIBRARY_SLOT};
