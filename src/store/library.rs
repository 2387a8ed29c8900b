use std::path::{Path, PathBuf};

use chrono::{Local, SubsecRound};
use tracing::{info, warn};

use crate::error::{LibraryError, ValidationError};
use crate::models::{Book, BookId, NewBook};

use super::file::{load, save};

/// The session's book collection together with the file that backs it. Every
/// mutation rewrites the whole file exactly once.
#[derive(Debug)]
pub struct Library {
    path: PathBuf,
    books: Vec<Book>,
}

impl Library {
    /// Load the collection stored at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        let books = load(&path)?;
        Ok(Self { path, books })
    }

    /// Start with nothing in memory, e.g. after the file failed to load.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            books: Vec::new(),
        }
    }

    /// Re-read the file. On failure the in-memory collection is left alone.
    pub fn reload(&mut self) -> Result<(), LibraryError> {
        self.books = load(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn find(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Validate, stamp, append, and persist a new book.
    pub fn add(&mut self, new_book: NewBook) -> Result<&Book, LibraryError> {
        let title = new_book.title.trim();
        if title.is_empty() {
            warn!("rejected book without a title");
            return Err(ValidationError::EmptyTitle.into());
        }
        let author = new_book.author.trim();
        if author.is_empty() {
            warn!(title, "rejected book without an author");
            return Err(ValidationError::EmptyAuthor.into());
        }

        let book = Book {
            id: BookId::new(),
            title: title.to_string(),
            author: author.to_string(),
            publication_year: new_book.publication_year,
            genre: new_book.genre.trim().to_string(),
            read_status: new_book.read_status,
            added_date: Local::now().naive_local().trunc_subsecs(0),
        };

        self.books.push(book);
        if let Err(err) = save(&self.path, &self.books) {
            self.books.pop();
            return Err(err.into());
        }

        let index = self.books.len() - 1;
        let book = &self.books[index];
        info!(id = %book.id, title = %book.title, "added book");
        Ok(book)
    }

    /// Remove the book at `index` in the current display order.
    pub fn remove(&mut self, index: usize) -> Result<Book, LibraryError> {
        if index >= self.books.len() {
            warn!(index, len = self.books.len(), "remove index out of range");
            return Err(LibraryError::Index {
                index,
                len: self.books.len(),
            });
        }
        self.remove_at(index)
    }

    /// Remove by stable id, which stays valid after filtering or reordering.
    pub fn remove_by_id(&mut self, id: BookId) -> Result<Book, LibraryError> {
        match self.books.iter().position(|book| book.id == id) {
            Some(index) => self.remove_at(index),
            None => {
                warn!(%id, "remove for unknown book id");
                Err(LibraryError::NotFound(id))
            }
        }
    }

    fn remove_at(&mut self, index: usize) -> Result<Book, LibraryError> {
        let book = self.books.remove(index);
        if let Err(err) = save(&self.path, &self.books) {
            self.books.insert(index, book);
            return Err(err.into());
        }
        info!(id = %book.id, title = %book.title, "removed book");
        Ok(book)
    }
}
