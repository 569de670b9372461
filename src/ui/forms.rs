use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::ValidationError;
use crate::models::{Book, BookId};

/// Internal representation of the add-book panel fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) pages: String,
    pub(crate) read: bool,
    pub(crate) active: BookField,
}

/// Fields of the add-book form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Pages,
    Read,
}

impl BookField {
    fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Pages => "Pages",
            BookField::Read => "Read",
        }
    }
}

/// Values accepted by the form, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewBook {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) pages: String,
    pub(crate) read: bool,
}

impl BookForm {
    /// Move focus forward (Title → Author → Pages → Read → Title).
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Pages,
            BookField::Pages => BookField::Read,
            BookField::Read => BookField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Read,
            BookField::Author => BookField::Title,
            BookField::Pages => BookField::Author,
            BookField::Read => BookField::Pages,
        };
    }

    /// Append a character to the active field. Pages takes digits only and
    /// the read checkbox flips on space.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Title | BookField::Author if ch.is_control() => false,
            BookField::Title => {
                self.title.push(ch);
                true
            }
            BookField::Author => {
                self.author.push(ch);
                true
            }
            BookField::Pages => {
                if ch.is_ascii_digit() {
                    self.pages.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Read => {
                if ch == ' ' {
                    self.read = !self.read;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Pages => {
                self.pages.pop();
            }
            BookField::Read => {}
        }
    }

    /// Check the required fields. Title is reported before author.
    pub(crate) fn validate(&self) -> Result<NewBook, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        Ok(NewBook {
            title: title.to_string(),
            author: author.to_string(),
            pages: self.pages.trim().to_string(),
            read: self.read,
        })
    }

    /// Empty every field and put focus back on the title.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, is_empty) = match field {
            BookField::Title => placeholder(&self.title, "<required>"),
            BookField::Author => placeholder(&self.author, "<required>"),
            BookField::Pages => placeholder(&self.pages, "<optional>"),
            BookField::Read => {
                let mark = if self.read { "[x]" } else { "[ ]" };
                (mark.to_string(), false)
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if is_empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset for the active field, if it takes text.
    pub(crate) fn cursor_offset(&self) -> Option<(u16, u16)> {
        let (row, value) = match self.active {
            BookField::Title => (0, &self.title),
            BookField::Author => (1, &self.author),
            BookField::Pages => (2, &self.pages),
            BookField::Read => return None,
        };
        let prefix = self.active.label().len() + 2;
        Some(((prefix + value.chars().count()) as u16, row))
    }
}

fn placeholder(value: &str, empty: &str) -> (String, bool) {
    if value.is_empty() {
        (empty.to_string(), true)
    } else {
        (value.to_string(), false)
    }
}

/// Pending confirmation for removing a book.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: BookId,
    pub(crate) title: String,
    pub(crate) author: String,
}

impl From<&Book> for ConfirmBookDelete {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}
