//! Pure read-only computations over a snapshot of the library: substring
//! search and aggregate statistics. Nothing here touches the file system.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::{Book, SearchField, Statistics};

/// Books whose `field` contains `term`, ignoring case, in library order. A
/// blank genre never matches a non-empty term; an empty term matches all.
pub fn search<'a>(books: &'a [Book], term: &str, field: SearchField) -> Vec<&'a Book> {
    let needle = term.to_lowercase();
    let matches: Vec<&Book> = books
        .iter()
        .filter(|book| field.value(book).to_lowercase().contains(&needle))
        .collect();
    debug!(term, field = %field, hits = matches.len(), "searched library");
    matches
}

/// Tabulate totals plus per-genre, per-author, and per-decade counts.
pub fn stats(books: &[Book]) -> Statistics {
    let total = books.len();
    let read_count = books.iter().filter(|book| book.read_status).count();

    let mut by_decade = BTreeMap::new();
    for book in books {
        *by_decade.entry(book.decade()).or_insert(0) += 1;
    }

    Statistics {
        total,
        read_count,
        percent_read: percent(read_count, total),
        by_genre: tally(books.iter().map(|book| book.genre.as_str())),
        by_author: tally(books.iter().map(|book| book.author.as_str())),
        by_decade,
    }
}

/// Whole-number percentage, rounding halves to even. Zero when `total` is 0.
fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round_ties_even() as u32
}

/// Count occurrences, then order by descending count. `sort_by` is stable, so
/// equal counts stay in first-seen order.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for key in keys {
        match slots.get(key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
