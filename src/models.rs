//! Domain models that get persisted into the `library` slot and passed
//! throughout the TUI. These types stay light-weight data holders so the store
//! and the view projection can focus on their own rules.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable identifier assigned to a book when it is created. The UI addresses
/// rows by this id so a deletion never invalidates a reference to another row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of the library.
pub struct Book {
    /// Older stored libraries carry no id; those records get a fresh one on
    /// load.
    #[serde(default)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Page count exactly as typed into the form. Kept as text because the
    /// form never coerces it.
    #[serde(deserialize_with = "pages_from_text_or_number")]
    pub pages: String,
    #[serde(default)]
    pub read: bool,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        pages: impl Into<String>,
        read: bool,
    ) -> Self {
        Self {
            id: BookId::new(),
            title: title.into(),
            author: author.into(),
            pages: pages.into(),
            read,
        }
    }

    pub fn toggle_read(&mut self) {
        self.read = !self.read;
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

/// The two example books shown on first run so the table is never empty.
pub fn seed_books() -> Vec<Book> {
    vec![
        Book::new("Mindset", "Carol S. Dweck", "320", true),
        Book::new("One Day", "David Nicholls", "437", false),
    ]
}

/// Accept `"412"` as well as `412` for the page count.
fn pages_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Pages {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Pages::deserialize(deserializer)? {
        Pages::Text(text) => text,
        Pages::Number(number) => number.to_string(),
    })
}
