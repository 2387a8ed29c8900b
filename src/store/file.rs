use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::models::Book;

/// Read every book from `path`. A missing file is an empty library, not an
/// error.
pub fn load(path: &Path) -> Result<Vec<Book>, PersistenceError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no library file yet, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let books: Vec<Book> = serde_json::from_slice(&raw).map_err(|source| PersistenceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), count = books.len(), "loaded library");
    Ok(books)
}

/// Serialize the whole collection over `path`. The JSON lands in a sibling
/// temp file first and is renamed into place, so readers never observe a
/// half-written document.
pub fn save(path: &Path, books: &[Book]) -> Result<(), PersistenceError> {
    let write_err = |source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = temp_path(path);
    let file = fs::File::create(&tmp_path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    let written = serde_json::to_writer_pretty(&mut writer, books)
        .map_err(|source| PersistenceError::Encode {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|()| writer.flush().map_err(write_err));
    drop(writer);

    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(source));
    }

    debug!(path = %path.display(), count = books.len(), "saved library");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_a_sibling() {
        assert_eq!(
            temp_path(Path::new("/data/library.json")),
            PathBuf::from("/data/library.json.tmp")
        );
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let books = load(&dir.path().join("absent.json")).unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "[{\"title\": ").unwrap();
        assert!(matches!(load(&path), Err(PersistenceError::Parse { .. })));
    }

    #[test]
    fn directory_in_place_of_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load(dir.path()), Err(PersistenceError::Read { .. })));
    }

    #[test]
    fn save_creates_parent_directories_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.json");
        save(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn save_under_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let err = save(&blocker.join("library.json"), &[]).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
