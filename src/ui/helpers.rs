use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::view::{FilterMode, StatusBadge};

/// Style of the read/unread control, keyed by the badge class.
pub(crate) fn badge_style(badge: StatusBadge) -> Style {
    match badge.class() {
        "read" => Style::default().fg(Color::Black).bg(Color::Green),
        _ => Style::default().fg(Color::Black).bg(Color::Red),
    }
}

pub(crate) fn badge_span(badge: StatusBadge) -> Span<'static> {
    Span::styled(format!(" {} ", badge.label()), badge_style(badge))
}

/// Render the three filter options with the active one highlighted.
pub(crate) fn filter_selector_line(active: FilterMode) -> Line<'static> {
    let mut spans = vec![Span::raw("Filter: ")];
    for (idx, mode) in FilterMode::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" | "));
        }
        let label = format!("{} {}", idx + 1, mode.label());
        if mode == active {
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
        }
    }
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
