//! Runtime settings, read from the environment at start-up.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::alert::DEFAULT_ALERT_TTL;
use crate::view::FilterMode;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
const LOG_FILE_NAME: &str = "bookshelf.log";

const HOME_VAR: &str = "BOOKSHELF_HOME";
const ALERT_VAR: &str = "BOOKSHELF_ALERT_MS";
const FILTER_VAR: &str = "BOOKSHELF_FILTER";
const LOG_VAR: &str = "BOOKSHELF_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub alert_ttl: Duration,
    pub initial_filter: FilterMode,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup(HOME_VAR).filter(|value| !value.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let alert_ttl = match lookup(ALERT_VAR) {
            Some(raw) => {
                let millis = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{ALERT_VAR} must be a number of milliseconds"))?;
                Duration::from_millis(millis)
            }
            None => DEFAULT_ALERT_TTL,
        };

        let initial_filter = match lookup(FILTER_VAR) {
            Some(raw) => raw
                .parse::<FilterMode>()
                .map_err(|err| anyhow!("{FILTER_VAR}: {err}"))?,
            None => FilterMode::All,
        };

        let log_filter = lookup(LOG_VAR).unwrap_or_else(|| "info".to_string());

        Ok(Self {
            data_dir,
            alert_ttl,
            initial_filter,
            log_filter,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// `~/.bookshelf`, resolved through the platform's home directory.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
