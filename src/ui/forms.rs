use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookId, NewBook};

/// Year pre-filled into a fresh form.
const DEFAULT_YEAR: u32 = 2023;

/// Form state for adding a book.
#[derive(Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: bool,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields within the book form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
}

impl BookField {
    pub(crate) const ORDER: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Genre,
        BookField::Read,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Genre => "Genre",
            BookField::Read => "Read",
        }
    }

    fn position(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| field == self)
            .unwrap_or(0)
    }
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: DEFAULT_YEAR.to_string(),
            genre: String::new(),
            read: false,
            active: BookField::Title,
            error: None,
        }
    }
}

impl BookForm {
    /// Move focus forward, wrapping after the last field.
    pub(crate) fn next_field(&mut self) {
        let idx = (self.active.position() + 1) % BookField::ORDER.len();
        self.active = BookField::ORDER[idx];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = BookField::ORDER.len();
        let idx = (self.active.position() + len - 1) % len;
        self.active = BookField::ORDER[idx];
    }

    /// Flip the read flag; only meaningful while it has focus.
    pub(crate) fn toggle_read(&mut self) -> bool {
        if self.active == BookField::Read {
            self.read = !self.read;
            true
        } else {
            false
        }
    }

    /// Append a character to the active field. Year only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Genre => self.genre.push(ch),
            BookField::Year => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.year.push(ch);
            }
            BookField::Read => return ch == ' ' && self.toggle_read(),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre => {
                self.genre.pop();
            }
            BookField::Read => {}
        }
    }

    /// Turn the raw text into a `NewBook`. Title and author are checked again
    /// by the store; this only rejects what cannot be typed correctly.
    pub(crate) fn parse_inputs(&self) -> Result<NewBook> {
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<u32>()
            .context("Publication year is out of range.")?;
        Ok(NewBook::new(self.title.clone(), self.author.clone(), year)
            .genre(self.genre.clone())
            .read(self.read))
    }

    /// Text shown for a field; the read flag renders as Yes/No.
    pub(crate) fn display_value(&self, field: BookField) -> String {
        match field {
            BookField::Title => self.title.clone(),
            BookField::Author => self.author.clone(),
            BookField::Year => self.year.clone(),
            BookField::Genre => self.genre.clone(),
            BookField::Read => String::from(if self.read { "Yes" } else { "No" }),
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.display_value(field);
        let is_active = self.active == field;
        let placeholder = match field {
            BookField::Title | BookField::Author | BookField::Year => "<required>",
            _ => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.display_value(field).chars().count()
    }
}

/// How the pending removal identifies its book.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RemoveTarget {
    /// Position in the full library list.
    Position(usize),
    /// Stable id, used from filtered views where positions differ.
    Id(BookId),
}

#[derive(Clone)]
pub(crate) struct ConfirmBookRemove {
    pub(crate) target: RemoveTarget,
    pub(crate) book: Book,
}
