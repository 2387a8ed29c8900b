use crate::models::{Book, SearchField};
use crate::query::search;

/// Top-level views, cycled with Tab in the order listed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum View {
    Library,
    Search,
    Stats,
}

impl View {
    pub(crate) const ALL: [View; 3] = [View::Library, View::Search, View::Stats];

    pub(crate) fn title(&self) -> &'static str {
        match self {
            View::Library => "Library",
            View::Search => "Search",
            View::Stats => "Library Stats",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            View::Library => View::Search,
            View::Search => View::Stats,
            View::Stats => View::Library,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            View::Library => View::Stats,
            View::Search => View::Library,
            View::Stats => View::Search,
        }
    }
}

/// Clamp-and-move helper shared by every scrolling list.
pub(crate) fn step_selection(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as isize - 1;
    (selected as isize + offset).clamp(0, max) as usize
}

/// Results of the most recent search. Results are a snapshot and are rerun
/// after any removal so they never point at a deleted book.
#[derive(Default)]
pub(crate) struct SearchScreen {
    pub(crate) field: SearchField,
    pub(crate) term: Option<String>,
    pub(crate) results: Vec<Book>,
    pub(crate) selected: usize,
}

impl SearchScreen {
    /// Run `term` against `books` and remember it for later refreshes.
    pub(crate) fn run(&mut self, books: &[Book], term: String, field: SearchField) {
        self.field = field;
        self.results = search(books, &term, field).into_iter().cloned().collect();
        self.term = Some(term);
        self.ensure_in_bounds();
    }

    /// Re-apply the remembered search after the library changed.
    pub(crate) fn refresh(&mut self, books: &[Book]) {
        if let Some(term) = self.term.take() {
            self.run(books, term, self.field);
        }
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.results.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.results.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.results.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        self.selected = self.selected.min(self.results.len().saturating_sub(1));
    }
}

/// Inline query editor shown over the search view.
#[derive(Clone, Default)]
pub(crate) struct SearchBar {
    pub(crate) query: String,
    pub(crate) field: SearchField,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::BookId;

    fn book(title: &str, author: &str) -> Book {
        Book {
            id: BookId::new(),
            title: title.to_string(),
            author: author.to_string(),
            publication_year: 1990,
            genre: String::new(),
            read_status: false,
            added_date: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0))
                .unwrap(),
        }
    }

    #[test]
    fn views_cycle_in_both_directions() {
        for view in View::ALL {
            assert_eq!(view.next().previous(), view);
        }
    }

    #[test]
    fn selection_clamps_to_bounds() {
        assert_eq!(step_selection(0, 0, 5), 0);
        assert_eq!(step_selection(0, 3, -1), 0);
        assert_eq!(step_selection(1, 3, 5), 2);
        assert_eq!(step_selection(2, 3, -1), 1);
    }

    #[test]
    fn refresh_drops_removed_books_and_clamps_selection() {
        let mut books = vec![book("Dune", "Herbert"), book("Dune Messiah", "Herbert")];
        let mut screen = SearchScreen::default();
        screen.run(&books, "dune".to_string(), SearchField::Title);
        screen.select_last();
        assert_eq!(screen.current_book().map(|b| b.title.as_str()), Some("Dune Messiah"));

        books.pop();
        screen.refresh(&books);
        assert_eq!(screen.results.len(), 1);
        assert_eq!(screen.selected, 0);
        assert_eq!(screen.term.as_deref(), Some("dune"));
    }

    #[test]
    fn refresh_without_a_search_is_a_no_op() {
        let mut screen = SearchScreen::default();
        screen.refresh(&[book("Emma", "Austen")]);
        assert!(screen.results.is_empty());
        assert!(screen.term.is_none());
    }
}
