//! Core library surface for the Bookshelf TUI application.
//!
//! The store and query modules are usable without the terminal front-end, so
//! other tooling can read and tabulate a library file directly.
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod ui;

pub use config::Config;
pub use error::{LibraryError, PersistenceError, ValidationError};

/// The domain types other layers manipulate.
pub use models::{Book, BookId, NewBook, SearchField, Statistics};

/// Pure operations over a snapshot of the collection.
pub use query::{search, stats};

/// The owned collection plus the raw file helpers it is built on.
pub use store::{load, save, Library};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
