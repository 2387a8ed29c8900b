use std::collections::BTreeMap;
use std::fs;

use bookshelf::{
    load, search, stats, Library, LibraryError, NewBook, PersistenceError, SearchField,
    ValidationError,
};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Library {
    Library::open(dir.path().join("library.json")).unwrap()
}

fn dune() -> NewBook {
    NewBook::new("Dune", "Frank Herbert", 1965)
        .genre("Science Fiction")
        .read(true)
}

fn hyperion() -> NewBook {
    NewBook::new("Hyperion", "Dan Simmons", 1989).genre("Science Fiction")
}

#[test]
fn adds_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = open(&dir);
    library.add(dune()).unwrap();
    library.add(hyperion()).unwrap();
    library
        .add(NewBook::new("Dune", "Frank Herbert", 1965))
        .unwrap();

    let reloaded = open(&dir);
    assert_eq!(reloaded.books(), library.books());
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn add_stamps_id_and_date_and_trims_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = open(&dir);
    let first = library
        .add(NewBook::new("  Emma ", " Jane Austen", 1815).genre(" Classic "))
        .unwrap()
        .clone();
    let second = library.add(dune()).unwrap().clone();

    assert_eq!(first.title, "Emma");
    assert_eq!(first.author, "Jane Austen");
    assert_eq!(first.genre, "Classic");
    assert_ne!(first.id, second.id);
    assert!(first.added_date <= second.added_date);
    assert_eq!(library.find(second.id), Some(&second));
}

#[test]
fn empty_title_or_author_is_rejected_without_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let mut library = open(&dir);

    let err = library.add(NewBook::new("", "Someone", 2000)).unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Validation(ValidationError::EmptyTitle)
    ));
    let err = library.add(NewBook::new("Something", "   ", 2000)).unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Validation(ValidationError::EmptyAuthor)
    ));

    assert!(library.is_empty());
    assert!(!path.exists());
}

#[test]
fn removing_an_invalid_index_twice_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = open(&dir);
    library.add(dune()).unwrap();
    library.add(hyperion()).unwrap();

    let removed = library.remove(1).unwrap();
    assert_eq!(removed.title, "Hyperion");
    let before = library.books().to_vec();

    for _ in 0..2 {
        let err = library.remove(1).unwrap_err();
        assert!(matches!(err, LibraryError::Index { index: 1, len: 1 }));
        assert_eq!(library.books(), before.as_slice());
    }
    assert_eq!(open(&dir).books(), before.as_slice());
}

#[test]
fn remove_by_id_follows_the_book_after_positions_shift() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = open(&dir);
    library.add(dune()).unwrap();
    let hyperion_id = library.add(hyperion()).unwrap().id;
    library.add(NewBook::new("Emma", "Jane Austen", 1815)).unwrap();

    library.remove(0).unwrap();
    let removed = library.remove_by_id(hyperion_id).unwrap();
    assert_eq!(removed.title, "Hyperion");

    let titles: Vec<_> = open(&dir).books().iter().map(|b| b.title.clone()).collect();
    assert_eq!(titles, ["Emma"]);

    let err = library.remove_by_id(hyperion_id).unwrap_err();
    assert!(matches!(err, LibraryError::NotFound(id) if id == hyperion_id));
    assert_eq!(library.len(), 1);
}

#[test]
fn failed_save_rolls_back_memory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let mut library = Library::empty(blocker.join("library.json"));

    let err = library.add(dune()).unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Persistence(PersistenceError::Write { .. })
    ));
    assert!(library.is_empty());
}

#[test]
fn corrupt_file_fails_reload_and_keeps_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let mut library = open(&dir);
    library.add(dune()).unwrap();

    fs::write(&path, "{ not a library").unwrap();
    let err = library.reload().unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Persistence(PersistenceError::Parse { .. })
    ));
    assert_eq!(library.len(), 1);
    assert!(Library::open(&path).is_err());
}

#[test]
fn legacy_file_without_ids_or_genre_loads_and_searches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    fs::write(
        &path,
        r#"[
            {"title": "Emma", "author": "Jane Austen", "publication_year": 1815,
             "read_status": true, "added_date": "2024-02-10 08:15:00"},
            {"title": "Dune", "author": "Frank Herbert", "publication_year": 1965,
             "genre": "Science Fiction", "read_status": false,
             "added_date": "2024-02-11 19:45:30"}
        ]"#,
    )
    .unwrap();

    let books = load(&path).unwrap();
    assert_eq!(books.len(), 2);
    assert_ne!(books[0].id, books[1].id);

    let hits = search(&books, "science", SearchField::Genre);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Dune");
    assert_eq!(search(&books, "", SearchField::Genre).len(), 2);

    let stats = stats(&books);
    assert_eq!(
        stats.by_genre,
        vec![("".to_string(), 1), ("Science Fiction".to_string(), 1)]
    );
}

#[test]
fn two_book_example_statistics_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = open(&dir);
    library.add(dune()).unwrap();
    library.add(hyperion()).unwrap();

    let stats = stats(library.books());
    assert_eq!(stats.total, 2);
    assert_eq!(stats.read_count, 1);
    assert_eq!(stats.percent_read, 50);
    assert_eq!(stats.by_decade, BTreeMap::from([(1960, 1), (1980, 1)]));

    let field: SearchField = "Title".parse().unwrap();
    let hits = search(library.books(), "dune", field);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Dune");

    let field: SearchField = "Author".parse().unwrap();
    let hits = search(library.books(), "simmons", field);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Hyperion");
}

#[test]
fn empty_library_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let library = open(&dir);
    let stats = stats(library.books());
    assert_eq!(stats.total, 0);
    assert_eq!(stats.read_count, 0);
    assert_eq!(stats.percent_read, 0);
    assert!(stats.by_genre.is_empty());
    assert!(stats.by_author.is_empty());
    assert!(stats.by_decade.is_empty());
}

#[test]
fn persisted_file_is_a_plain_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = open(&dir);
    library.add(dune()).unwrap();

    let raw = fs::read_to_string(dir.path().join("library.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];
    assert_eq!(record["title"], "Dune");
    assert_eq!(record["publication_year"], 1965);
    assert_eq!(record["read_status"], true);
    let added = record["added_date"].as_str().unwrap();
    assert_eq!(added.len(), "YYYY-MM-DD HH:MM:SS".len());
}
