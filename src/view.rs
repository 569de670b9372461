//! View projection: a pure description of what the table shows for a given
//! library and filter. The UI rebuilds it after every change instead of
//! patching rows in place.

use std::fmt;
use std::str::FromStr;

use crate::models::{Book, BookId};

/// Which books the table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    ReadOnly,
    UnreadOnly,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::ReadOnly, FilterMode::UnreadOnly];

    pub fn matches(self, book: &Book) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::ReadOnly => book.read,
            FilterMode::UnreadOnly => !book.read,
        }
    }

    /// Cycle All -> Read Only -> Unread Only -> All.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::ReadOnly,
            FilterMode::ReadOnly => FilterMode::UnreadOnly,
            FilterMode::UnreadOnly => FilterMode::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::ReadOnly => "Read Only",
            FilterMode::UnreadOnly => "Unread Only",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "read" | "read-only" | "read_only" => Ok(FilterMode::ReadOnly),
            "unread" | "unread-only" | "unread_only" => Ok(FilterMode::UnreadOnly),
            other => Err(format!("unknown filter mode '{other}'")),
        }
    }
}

/// Read/unread control of a row. Always derived from the stored flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub read: bool,
}

impl StatusBadge {
    pub fn label(self) -> &'static str {
        if self.read {
            "Read"
        } else {
            "Unread"
        }
    }

    pub fn class(self) -> &'static str {
        if self.read {
            "read"
        } else {
            "unread"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: BookId,
    /// Position of the book in the library at render time.
    pub position: usize,
    pub title: String,
    pub author: String,
    pub pages: String,
    pub badge: StatusBadge,
    pub visible: bool,
    /// Whether the row draws its bottom separator. Cleared on the last
    /// visible row only.
    pub separator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryView {
    pub mode: FilterMode,
    rows: Vec<RowView>,
}

impl LibraryView {
    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &RowView> {
        self.rows.iter().filter(|row| row.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_count() == 0
    }

    pub fn last_visible(&self) -> Option<&RowView> {
        self.rows.iter().rev().find(|row| row.visible)
    }

    /// Position of `id` among the visible rows.
    pub fn position_of(&self, id: BookId) -> Option<usize> {
        self.visible_rows().position(|row| row.id == id)
    }

    pub fn visible_at(&self, position: usize) -> Option<&RowView> {
        self.visible_rows().nth(position)
    }
}

/// Project `books` through `mode`.
pub fn render(books: &[Book], mode: FilterMode) -> LibraryView {
    let mut rows: Vec<RowView> = books
        .iter()
        .enumerate()
        .map(|(position, book)| {
            let visible = mode.matches(book);
            RowView {
                id: book.id,
                position,
                title: book.title.clone(),
                author: book.author.clone(),
                pages: book.pages.clone(),
                badge: StatusBadge { read: book.read },
                visible,
                separator: visible,
            }
        })
        .collect();

    // Nothing visible means there is no last row to strip.
    if let Some(last) = rows.iter_mut().rev().find(|row| row.visible) {
        last.separator = false;
    }

    LibraryView { mode, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_books;

    fn sample() -> Vec<Book> {
        vec![
            Book::new("Mindset", "Carol S. Dweck", "320", true),
            Book::new("One Day", "David Nicholls", "437", false),
            Book::new("Dune", "Frank Herbert", "412", false),
            Book::new("Emma", "Jane Austen", "474", true),
        ]
    }

    fn visible_titles(view: &LibraryView) -> Vec<&str> {
        view.visible_rows().map(|row| row.title.as_str()).collect()
    }

    #[test]
    fn all_shows_every_row() {
        let view = render(&sample(), FilterMode::All);
        assert!(view.rows().iter().all(|row| row.visible));
        assert_eq!(view.visible_count(), 4);
    }

    #[test]
    fn read_and_unread_partition_the_library() {
        let books = sample();
        let read = render(&books, FilterMode::ReadOnly);
        let unread = render(&books, FilterMode::UnreadOnly);

        assert_eq!(visible_titles(&read), vec!["Mindset", "Emma"]);
        assert_eq!(visible_titles(&unread), vec!["One Day", "Dune"]);
        for (r, u) in read.rows().iter().zip(unread.rows()) {
            assert_ne!(r.visible, u.visible, "{} must be in exactly one subset", r.title);
        }
    }

    #[test]
    fn only_the_last_visible_row_drops_its_separator() {
        let view = render(&sample(), FilterMode::UnreadOnly);
        let separators: Vec<(bool, bool)> = view
            .rows()
            .iter()
            .map(|row| (row.visible, row.separator))
            .collect();
        assert_eq!(
            separators,
            vec![(false, false), (true, true), (true, false), (false, false)]
        );
        assert_eq!(view.last_visible().map(|row| row.title.as_str()), Some("Dune"));
    }

    #[test]
    fn empty_visible_set_is_not_an_error() {
        let books = vec![Book::new("Mindset", "Carol S. Dweck", "320", true)];
        let view = render(&books, FilterMode::UnreadOnly);
        assert!(view.is_empty());
        assert!(view.last_visible().is_none());
        assert!(view.rows().iter().all(|row| !row.separator));

        let view = render(&[], FilterMode::All);
        assert!(view.rows().is_empty());
        assert!(view.last_visible().is_none());
    }

    #[test]
    fn badge_follows_the_read_flag() {
        let view = render(&seed_books(), FilterMode::All);
        assert_eq!(view.rows()[0].badge.label(), "Read");
        assert_eq!(view.rows()[0].badge.class(), "read");
        assert_eq!(view.rows()[1].badge.label(), "Unread");
        assert_eq!(view.rows()[1].badge.class(), "unread");
    }

    #[test]
    fn positions_are_library_positions_not_visible_positions() {
        let books = sample();
        let view = render(&books, FilterMode::ReadOnly);
        let emma = view.visible_at(1).unwrap();
        assert_eq!(emma.position, 3);
        assert_eq!(view.position_of(books[3].id), Some(1));
        assert_eq!(view.position_of(books[1].id), None);
    }

    #[test]
    fn filter_mode_cycles_and_parses() {
        assert_eq!(FilterMode::All.next(), FilterMode::ReadOnly);
        assert_eq!(FilterMode::ReadOnly.next(), FilterMode::UnreadOnly);
        assert_eq!(FilterMode::UnreadOnly.next(), FilterMode::All);

        assert_eq!("Read-Only".parse::<FilterMode>(), Ok(FilterMode::ReadOnly));
        assert_eq!(" unread ".parse::<FilterMode>(), Ok(FilterMode::UnreadOnly));
        assert_eq!("all".parse::<FilterMode>(), Ok(FilterMode::All));
        assert!("some".parse::<FilterMode>().is_err());
    }
}
