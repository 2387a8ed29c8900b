//! Typed failures surfaced by the store. The UI renders them in the footer and
//! keeps running; only setup problems in `main.rs` go through `anyhow`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::BookId;

/// The library file could not be read, parsed, or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read library file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("library file {} is not valid", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write library file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode library for {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A new book was missing a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Book title is required.")]
    EmptyTitle,
    #[error("Author is required.")]
    EmptyAuthor,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No book at position {index} (library holds {len}).")]
    Index { index: usize, len: usize },
    #[error("Book {0} not found.")]
    NotFound(BookId),
}
