use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf";
/// JSON file name stored inside the application data directory.
const LIBRARY_FILE_NAME: &str = "library.json";
/// Log file written next to the library; stdout belongs to the TUI.
const LOG_FILE_NAME: &str = "bookshelf.log";
/// Overrides the library location when set.
pub const LIBRARY_PATH_VAR: &str = "BOOKSHELF_LIBRARY";
/// `EnvFilter` directives for the log file.
pub const LOG_FILTER_VAR: &str = "BOOKSHELF_LOG";

/// Resolved runtime paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub library_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Read `BOOKSHELF_LIBRARY`, falling back to `~/.bookshelf/library.json`.
    pub fn from_env() -> Result<Self> {
        match env::var_os(LIBRARY_PATH_VAR) {
            Some(path) if !path.is_empty() => Ok(Self::with_library_path(path)),
            _ => Ok(Self::with_library_path(default_library_path()?)),
        }
    }

    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        let library_path = path.into();
        let log_path = library_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_FILE_NAME);
        Self {
            library_path,
            log_path,
        }
    }
}

/// Resolve the absolute path to the library file inside the user's home.
fn default_library_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs
        .home_dir()
        .join(DATA_DIR_NAME)
        .join(LIBRARY_FILE_NAME))
}
