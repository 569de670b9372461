use std::mem;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::alert::{AlertKind, AlertTimer};
use crate::error::ValidationError;
use crate::models::{Book, BookId};
use crate::store::Library;
use crate::view::{render, FilterMode, LibraryView};

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{badge_span, centered_rect, filter_selector_line, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header with the filter selector and the add-book toggle.
const HEADER_HEIGHT: u16 = 3;
/// Four form lines, the alert line and the panel borders.
const PANEL_HEIGHT: u16 = 8;

/// Fine-grained modes layered over the table.
enum Mode {
    Normal,
    ConfirmDelete(ConfirmBookDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. Owns the library; every handler goes through it
/// and the table is re-projected from it on each draw.
pub struct App {
    library: Library,
    filter: FilterMode,
    /// Selected book, by id. Never a cached position.
    selected: Option<BookId>,
    /// Visible position to fall back to when the selected book disappears.
    selected_hint: usize,
    panel_open: bool,
    form: BookForm,
    alerts: AlertTimer,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library, filter: FilterMode, alert_ttl: Duration) -> Self {
        let mut app = Self {
            library,
            filter,
            selected: None,
            selected_hint: 0,
            panel_open: false,
            form: BookForm::default(),
            alerts: AlertTimer::new(alert_ttl),
            mode: Mode::Normal,
            status: None,
        };
        app.sync_selection();
        app
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Current projection of the library through the active filter.
    pub fn view(&self) -> LibraryView {
        render(self.library.books(), self.filter)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        self.handle_key_at(code, Instant::now())
    }

    /// Dispatch a key press. Returns `true` when the app should exit.
    pub fn handle_key_at(&mut self, code: KeyCode, now: Instant) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal if self.panel_open => {
                self.handle_panel_key(code, now);
                Mode::Normal
            }
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };

        Ok(exit)
    }

    /// Expire the form alert once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        self.alerts.expire(now);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.select_visible(0),
            KeyCode::End => self.select_visible(usize::MAX),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if let Some(book) = self.current_book() {
                    let confirm = ConfirmBookDelete::from(book);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status("No book selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => self.set_filter(self.filter.next()),
            KeyCode::Char('1') => self.set_filter(FilterMode::All),
            KeyCode::Char('2') => self.set_filter(FilterMode::ReadOnly),
            KeyCode::Char('3') => self.set_filter(FilterMode::UnreadOnly),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                self.clear_status();
                self.toggle_panel();
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_panel_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Esc => self.toggle_panel(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => {
                if let Err(err) = self.submit_form(now) {
                    if err.downcast_ref::<ValidationError>().is_none() {
                        self.set_status(surface_error(&err), StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                self.form.push_char(ch);
            }
            _ => {}
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(err) = self.perform_delete(&confirm) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Validate the panel form and add the book. A validation failure shows a
    /// warning alert and leaves the library untouched.
    fn submit_form(&mut self, now: Instant) -> Result<Book> {
        let new_book = match self.form.validate() {
            Ok(new_book) => new_book,
            Err(err) => {
                self.alerts.show(AlertKind::from(err), now);
                return Err(err.into());
            }
        };

        let book = self
            .library
            .add(new_book.title, new_book.author, new_book.pages, new_book.read)
            .context("failed to add book")?;

        self.form.reset();
        self.alerts.show(AlertKind::BookAdded, now);
        if self.filter.matches(&book) {
            self.selected = Some(book.id);
        }
        self.sync_selection();
        Ok(book)
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };

        match self
            .library
            .toggle_read(id)
            .context("failed to update read status")
        {
            Ok(read) => {
                let title = self
                    .library
                    .get(id)
                    .map(|book| book.title.clone())
                    .unwrap_or_default();
                let label = if read { "read" } else { "unread" };
                self.set_status(format!("Marked '{title}' as {label}."), StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
        self.sync_selection();
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        self.library
            .remove(confirm.id)
            .context("failed to delete book")?;
        self.set_status(format!("Deleted '{}'.", confirm.title), StatusKind::Info);
        self.sync_selection();
        Ok(())
    }

    fn set_filter(&mut self, filter: FilterMode) {
        debug!(from = %self.filter, to = %filter, "filter changed");
        self.filter = filter;
        self.set_status(format!("Showing {}.", filter.label()), StatusKind::Info);
        self.sync_selection();
    }

    fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
        if self.panel_open {
            self.form.active = BookField::Title;
        } else {
            self.alerts.cancel();
        }
    }

    fn panel_toggle_label(&self) -> &'static str {
        if self.panel_open {
            "- Add Book"
        } else {
            "+ Add Book"
        }
    }

    fn current_book(&self) -> Option<&Book> {
        self.selected.and_then(|id| self.library.get(id))
    }

    fn move_selection(&mut self, offset: isize) {
        let view = self.view();
        let count = view.visible_count();
        if count == 0 {
            return;
        }
        let current = self
            .selected
            .and_then(|id| view.position_of(id))
            .unwrap_or(0) as isize;
        let target = (current + offset).clamp(0, count as isize - 1) as usize;
        self.select_visible(target);
    }

    /// Select the visible row at `position`, clamped to the last row.
    fn select_visible(&mut self, position: usize) {
        let view = self.view();
        let count = view.visible_count();
        if count == 0 {
            self.selected = None;
            return;
        }
        let position = position.min(count - 1);
        self.selected = view.visible_at(position).map(|row| row.id);
        self.selected_hint = position;
    }

    /// Keep the selection on the same book while it stays visible; otherwise
    /// fall back to the row now occupying its last position.
    fn sync_selection(&mut self) {
        let view = self.view();
        match self.selected.and_then(|id| view.position_of(id)) {
            Some(position) => self.selected_hint = position,
            None => self.select_visible(self.selected_hint),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let panel_height = if self.panel_open { PANEL_HEIGHT } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(panel_height),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let view = self.view();
        self.draw_header(frame, chunks[0]);
        self.draw_table(frame, chunks[1], &view);
        if self.panel_open {
            self.draw_panel(frame, chunks[2]);
        }
        self.draw_footer(frame, chunks[3]);

        if let Mode::ConfirmDelete(confirm) = &self.mode {
            self.draw_confirm_delete(frame, area, confirm);
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Bookshelf");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(16)])
            .split(inner);

        let counts = format!(
            "   {} books, {} read, {} unread",
            self.library.len(),
            self.library.read_count(),
            self.library.unread_count()
        );
        let mut line = filter_selector_line(self.filter);
        line.spans
            .push(Span::styled(counts, Style::default().fg(Color::DarkGray)));
        frame.render_widget(Paragraph::new(line), columns[0]);

        let toggle = Paragraph::new(Span::styled(
            format!("[{}]", self.panel_toggle_label()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right);
        frame.render_widget(toggle, columns[1]);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, view: &LibraryView) {
        if view.is_empty() {
            let text = if self.library.is_empty() {
                "No books yet. Press 'a' to add one."
            } else {
                "No books match this filter."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        let rows = view.visible_rows().map(|row| {
            let style = if row.separator {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.title.clone()),
                Cell::from(row.author.clone()),
                Cell::from(row.pages.clone()),
                Cell::from(Line::from(badge_span(row.badge))),
            ])
            .style(style)
        });

        let header = Row::new(vec!["Title", "Author", "Pages", "Status"]).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(35),
                Constraint::Length(7),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Library"))
        .row_highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("> ");

        let mut state =
            TableState::default().with_selected(self.selected.and_then(|id| view.position_of(id)));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.panel_toggle_label());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            self.form.build_line(BookField::Title),
            self.form.build_line(BookField::Author),
            self.form.build_line(BookField::Pages),
            self.form.build_line(BookField::Read),
        ];

        if let Some(alert) = self.alerts.current() {
            let style = if alert.kind.is_warning() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            };
            lines.push(Line::from(Span::styled(alert.kind.message(), style)));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to add • Tab to switch • Space toggles Read • Esc to close",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        if let Some((x, y)) = self.form.cursor_offset() {
            frame.set_cursor_position((inner.x + x, inner.y + y));
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.mode, self.panel_open) {
            (Mode::ConfirmDelete(_), _) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[n]", key_style),
                Span::raw(" Keep"),
            ]),
            (Mode::Normal, true) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Add   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close Panel"),
            ]),
            (Mode::Normal, false) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Read/Unread   "),
                Span::styled("[d]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[f/1-3]", key_style),
                Span::raw(" Filter   "),
                Span::styled("[a]", key_style),
                Span::raw(" Add Book   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        let lines = vec![
            Line::from(format!("Delete '{}' by {}?", confirm.title, confirm.author)),
            Line::from(""),
            Line::from(Span::styled(
                "y/Enter to delete • n/Esc to keep",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}
