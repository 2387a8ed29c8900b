use std::error::Error;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, ADDED_DATE_FORMAT};

/// Label used wherever a blank genre would otherwise render as nothing.
pub(crate) const NO_GENRE_LABEL: &str = "Uncategorized";

/// Build the text for one book card. The selected card gets an arrow marker.
pub(crate) fn book_card_lines(book: &Book, selected: bool) -> Vec<Line<'static>> {
    let title = if selected {
        format!("▶ {}", book.title)
    } else {
        book.title.clone()
    };
    let genre = if book.genre.trim().is_empty() {
        NO_GENRE_LABEL.to_string()
    } else {
        book.genre.clone()
    };
    let status_style = if book.read_status {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let label_style = Style::default().fg(Color::Gray);

    vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Author: ", label_style),
            Span::raw(book.author.clone()),
            Span::styled("   Year: ", label_style),
            Span::raw(book.publication_year.to_string()),
            Span::styled("   Genre: ", label_style),
            Span::raw(genre),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label_style),
            Span::styled(book.status_label(), status_style),
            Span::styled("   Added: ", label_style),
            Span::raw(book.added_date.format(ADDED_DATE_FORMAT).to_string()),
        ]),
    ]
}

/// Convert tally rows into bar chart data, naming the blank key.
pub(crate) fn chart_rows<K: ToString>(rows: impl IntoIterator<Item = (K, usize)>) -> Vec<(String, u64)> {
    rows.into_iter()
        .map(|(key, count)| {
            let label = key.to_string();
            let label = if label.trim().is_empty() {
                NO_GENRE_LABEL.to_string()
            } else {
                label
            };
            (label, count as u64)
        })
        .collect()
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

/// Flatten an error and its sources into one footer-sized sentence.
pub(crate) fn surface_error(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
