//! Persistent top-ten score table.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PersistenceError;

pub const MAX_ENTRIES: usize = 10;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub score: u32,
    pub length: usize,
    #[serde(rename = "date", alias = "timestamp")]
    pub timestamp: String,
}

/// Reads the stored entries. `Ok(None)` means there is no file yet.
pub fn read_entries(path: &Path) -> Result<Option<Vec<LeaderboardEntry>>, PersistenceError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Replaces the file wholesale through a sibling temp file and a rename.
pub fn write_entries(path: &Path, entries: &[LeaderboardEntry]) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(entries)?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    /// Sorted by score, highest first.
    entries: Vec<LeaderboardEntry>,
    path: Option<PathBuf>,
}

impl Leaderboard {
    /// A leaderboard that is never written to disk.
    pub fn in_memory() -> Self {
        Leaderboard::default()
    }

    /// Loads the table stored at `path`, starting empty if the file is
    /// missing or unreadable. A missing file is created.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = match read_entries(&path) {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                if let Err(e) = write_entries(&path, &[]) {
                    warn!(error = %e, "could not create leaderboard file");
                }
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "falling back to an empty leaderboard");
                Vec::new()
            }
        };
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES);
        info!(path = %path.display(), entries = entries.len(), "leaderboard loaded");

        Leaderboard {
            entries,
            path: Some(path),
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top_scores(&self, limit: usize) -> &[LeaderboardEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn high_score(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    /// Whether `score` would earn a place in the table.
    pub fn is_high_score(&self, score: u32) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries
            .iter()
            .map(|e| e.score)
            .min()
            .map_or(true, |lowest| score > lowest)
    }

    /// Records a finished run stamped with the current local time.
    ///
    /// Returns the 1-based rank the run landed on, or `None` if the score was
    /// zero or did not make the table.
    pub fn add_score(&mut self, score: u32, length: usize) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let entry = LeaderboardEntry {
            score,
            length,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        let rank = self.insert(entry);
        self.persist();
        rank
    }

    /// Ties keep the older entry ahead.
    fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let index = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_ENTRIES);
        (index < MAX_ENTRIES).then_some(index + 1)
    }

    pub fn reset_scores(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        match write_entries(path, &self.entries) {
            Ok(()) => info!(path = %path.display(), entries = self.entries.len(), "leaderboard saved"),
            Err(e) => warn!(error = %e, "leaderboard not saved"),
        }
    }
}
