//! Persistence split across two pieces: the flat JSON file helpers and the
//! owned `Library` that keeps memory and disk in step.

mod file;
mod library;

pub use file::{load, save};
pub use library::Library;
