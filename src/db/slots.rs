use std::cell::RefCell;
use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{LibraryError, Result};

/// Slot holding the JSON-serialized book list.
pub const LIBRARY_SLOT: &str = "library";

/// A flat key-value store. Every value is replaced wholesale on write; there
/// are no partial updates and no versioning.
pub trait SlotStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Slots kept in the `slots` table of the application database.
pub struct SqliteSlots {
    conn: Connection,
}

impl SqliteSlots {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Private in-memory database, mostly useful in tests.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::ensure_schema(&conn)?;
        Ok(Self::new(conn))
    }
}

impl SlotStore for SqliteSlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory slots for tests.
///
/// Uses `RefCell` so the trait can take `&self` everywhere, the same as the
/// SQLite connection does.
#[derive(Default)]
pub struct MemorySlots {
    values: RefCell<HashMap<String, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let slots = Self::new();
        slots
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        slots
    }

    /// Make every subsequent write fail until switched off again.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }
}

impl SlotStore for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(LibraryError::Unavailable(
                "simulated write error".to_string(),
            ));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_slot_is_overwritten_not_appended() {
        let slots = SqliteSlots::in_memory().unwrap();
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap(), None);

        slots.write(LIBRARY_SLOT, "[]").unwrap();
        slots.write(LIBRARY_SLOT, "[1]").unwrap();
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap().as_deref(), Some("[1]"));

        let rows: i64 = slots
            .conn
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn sqlite_slot_can_be_removed() {
        let slots = SqliteSlots::in_memory().unwrap();
        slots.write(LIBRARY_SLOT, "[]").unwrap();
        slots.remove(LIBRARY_SLOT).unwrap();
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap(), None);
    }

    #[test]
    fn sqlite_slots_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.sqlite");

        {
            let slots = SqliteSlots::new(super::super::open_database(&path).unwrap());
            slots.write(LIBRARY_SLOT, "[]").unwrap();
        }

        let slots = SqliteSlots::new(super::super::open_database(&path).unwrap());
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn memory_slots_simulate_write_failures() {
        let slots = MemorySlots::with_slot(LIBRARY_SLOT, "[]");
        slots.set_simulate_write_error(true);
        assert!(matches!(
            slots.write(LIBRARY_SLOT, "[1]"),
            Err(LibraryError::Unavailable(_))
        ));
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap().as_deref(), Some("[]"));

        slots.set_simulate_write_error(false);
        slots.write(LIBRARY_SLOT, "[1]").unwrap();
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap().as_deref(), Some("[1]"));
    }
}
