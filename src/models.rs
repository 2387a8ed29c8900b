//! Domain models that mirror the JSON persistence file and get passed
//! throughout the TUI. These types stay light-weight data holders so the store
//! and the query engine can focus on persistence and tabulation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp layout used for `added_date` in the persistence file.
pub const ADDED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stable opaque identifier assigned to a book when it is created.
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
/// One catalogued book. Field names match the on-disk JSON keys.
pub struct Book {
    /// Legacy files predate ids, so a fresh one is minted while loading.
    #[serde(default)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publication_year: u32,
    /// Empty when unknown. Older records may omit the key entirely.
    #[serde(default)]
    pub genre: String,
    pub read_status: bool,
    #[serde(with = "added_date")]
    pub added_date: NaiveDateTime,
}

impl Book {
    /// Publication year rounded down to the nearest multiple of ten.
    pub fn decade(&self) -> u32 {
        self.publication_year - self.publication_year % 10
    }

    /// Human-friendly read status used by cards and search results.
    pub fn status_label(&self) -> &'static str {
        if self.read_status {
            "Read"
        } else {
            "Unread"
        }
    }

    /// Compose a `Title - Author` string for status messages.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Caller-supplied fields for a book that does not exist yet. The store fills
/// in the id and the creation timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: u32,
    pub genre: String,
    pub read_status: bool,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, publication_year: u32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_year,
            ..Self::default()
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn read(mut self, read_status: bool) -> Self {
        self.read_status = read_status;
        self
    }
}

/// Which text field a search compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Genre,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::Author, SearchField::Genre];

    pub fn label(&self) -> &'static str {
        match self {
            SearchField::Title => "Title",
            SearchField::Author => "Author",
            SearchField::Genre => "Genre",
        }
    }

    /// Cycle to the next field; used by the search bar's Tab key.
    pub fn next(self) -> Self {
        match self {
            SearchField::Title => SearchField::Author,
            SearchField::Author => SearchField::Genre,
            SearchField::Genre => SearchField::Title,
        }
    }

    /// Borrow the matching text field from a book.
    pub fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
            SearchField::Genre => &book.genre,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search field `{0}` (expected title, author or genre)")]
pub struct UnknownSearchField(pub String);

impl FromStr for SearchField {
    type Err = UnknownSearchField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "genre" => Ok(SearchField::Genre),
            _ => Err(UnknownSearchField(s.to_string())),
        }
    }
}

/// Aggregate figures over a snapshot of the library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total: usize,
    pub read_count: usize,
    pub percent_read: u32,
    /// Genre tallies, highest count first; ties keep first-seen order.
    pub by_genre: Vec<(String, usize)>,
    /// Author tallies, same ordering rule as `by_genre`.
    pub by_author: Vec<(String, usize)>,
    pub by_decade: BTreeMap<u32, usize>,
}

mod added_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ADDED_DATE_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(ADDED_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, ADDED_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decade_rounds_down() {
        let book: Book = serde_json::from_str(
            r#"{"title":"Dune","author":"Frank Herbert","publication_year":1965,
                "genre":"Sci-Fi","read_status":true,"added_date":"2024-03-01 10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(book.decade(), 1960);
    }

    #[test]
    fn legacy_record_without_genre_or_id_loads() {
        let book: Book = serde_json::from_str(
            r#"{"title":"Emma","author":"Jane Austen","publication_year":1815,
                "read_status":false,"added_date":"2023-01-02 03:04:05"}"#,
        )
        .unwrap();
        assert_eq!(book.genre, "");
        assert_eq!(book.added_date.format(ADDED_DATE_FORMAT).to_string(), "2023-01-02 03:04:05");
    }

    #[test]
    fn added_date_is_written_in_legacy_layout() {
        let book: Book = serde_json::from_str(
            r#"{"title":"Emma","author":"Jane Austen","publication_year":1815,
                "read_status":false,"added_date":"2023-01-02 03:04:05"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["added_date"], "2023-01-02 03:04:05");
        assert_eq!(json["genre"], "");
        assert!(json["id"].is_string());
    }

    #[test]
    fn search_field_parses_ui_labels() {
        assert_eq!("Title".parse::<SearchField>(), Ok(SearchField::Title));
        assert_eq!("author".parse::<SearchField>(), Ok(SearchField::Author));
        assert_eq!(" GENRE ".parse::<SearchField>(), Ok(SearchField::Genre));
        assert!("year".parse::<SearchField>().is_err());
    }

    #[test]
    fn search_field_cycles() {
        let mut field = SearchField::default();
        for expected in [SearchField::Author, SearchField::Genre, SearchField::Title] {
            field = field.next();
            assert_eq!(field, expected);
        }
    }
}
