use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tic_tac_toe_core::{Mark, Winner};
use tracing::debug;

use crate::selector::{GameCounters, HUMAN};

pub const TOTAL_GAMES_KEY: &str = "total_games";
pub const TOTAL_DRAWS_KEY: &str = "total_draws";

pub fn wins_key(mark: Mark) -> &'static str {
    match mark {
        Mark::X => "wins_X",
        Mark::O => "wins_O",
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stats file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stats file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed integer storage for client-side stats.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<i64>;
    fn set(&mut self, key: &str, value: i64) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten after every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!("Opened stats file {} ({} keys)", path.display(), values.len());
        Ok(JsonFileStore { path, values })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.values).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkStats {
    pub wins: u32,
    pub games_played: u32,
    pub draws: u32,
}

/// Advisory win/draw counters. Never sent to the server.
#[derive(Debug)]
pub struct StatsTracker<S> {
    store: S,
}

impl<S: KeyValueStore> StatsTracker<S> {
    pub fn new(store: S) -> Self {
        StatsTracker { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn count(&self, key: &str) -> u32 {
        self.store
            .get(key)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0)
    }

    fn increment(&mut self, key: &str) -> Result<(), StoreError> {
        let next = i64::from(self.count(key)) + 1;
        self.store.set(key, next)
    }

    pub fn record(&mut self, winner: Winner) -> Result<(), StoreError> {
        self.increment(TOTAL_GAMES_KEY)?;
        match winner {
            Winner::X => self.increment(wins_key(Mark::X)),
            Winner::O => self.increment(wins_key(Mark::O)),
            Winner::Draw => self.increment(TOTAL_DRAWS_KEY),
        }
    }

    pub fn stats(&self, mark: Mark) -> MarkStats {
        MarkStats {
            wins: self.count(wins_key(mark)),
            games_played: self.count(TOTAL_GAMES_KEY),
            draws: self.count(TOTAL_DRAWS_KEY),
        }
    }

    pub fn counters(&self) -> GameCounters {
        GameCounters {
            total_games: self.count(TOTAL_GAMES_KEY),
            human_wins: self.count(wins_key(HUMAN)),
        }
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        for key in [
            wins_key(Mark::X),
            wins_key(Mark::O),
            TOTAL_GAMES_KEY,
            TOTAL_DRAWS_KEY,
        ] {
            self.store.remove(key)?;
        }
        Ok(())
    }
}
