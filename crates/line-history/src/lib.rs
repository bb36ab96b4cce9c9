//! Bounded history ring with substring search and escaped persistence.
//!
//! Entries are kept oldest first. Adds collapse consecutive duplicates and
//! evict the oldest entry once the ring is full. The session layer keeps the
//! newest slot as a scratch mirror of the line under edit via
//! [`History::push_entry`] / [`History::set`] / [`History::pop_newest`]; the
//! ring itself is policy-free about what those slots contain.
//!
//! On disk each entry is one line. Backslash escapes keep multi-line entries
//! intact: `\\` for a backslash, `\n` for LF, `\r` for CR.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

mod persist;

pub use persist::{decode_entry, encode_entry};

pub const DEFAULT_MAX_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Scan direction for incremental search. `Older` walks toward index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDir {
    Older,
    Newer,
}

/// A successful search: which entry matched and where the match starts,
/// in scalars, so the caller can park the cursor on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub index: usize,
    pub offset: usize,
}

#[derive(Debug)]
pub struct History {
    entries: Vec<String>,
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

impl History {
    /// `max_len` is clamped to at least 1.
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Add a line, collapsing a consecutive duplicate and evicting the
    /// oldest entry when full. Returns whether the ring changed.
    pub fn add(&mut self, line: &str) -> bool {
        if self.entries.last().map(String::as_str) == Some(line) {
            return false;
        }
        self.push_entry(line.to_string());
        true
    }

    /// Push unconditionally (no duplicate collapse). The eviction bound
    /// still applies.
    pub fn push_entry(&mut self, line: String) {
        if self.entries.len() == self.max_len {
            self.entries.remove(0);
        }
        self.entries.push(line);
    }

    /// Overwrite the entry at `index`; out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, line: String) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = line;
        }
    }

    pub fn pop_newest(&mut self) -> Option<String> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resize the ring, dropping oldest entries on shrink. Zero is refused.
    pub fn set_max_len(&mut self, max_len: usize) -> bool {
        if max_len == 0 {
            return false;
        }
        if self.entries.len() > max_len {
            let excess = self.entries.len() - max_len;
            self.entries.drain(..excess);
        }
        self.max_len = max_len;
        true
    }

    /// Substring search from `from` (inclusive) toward older or newer
    /// entries. Entries equal to `skip_same` never match, which keeps
    /// repeated Ctrl-R moving past the line already on screen.
    pub fn search(
        &self,
        pattern: &str,
        from: usize,
        dir: SearchDir,
        skip_same: Option<&str>,
    ) -> Option<SearchHit> {
        if self.entries.is_empty() || pattern.is_empty() {
            return None;
        }
        let from = from.min(self.entries.len() - 1);
        let indices: Vec<usize> = match dir {
            SearchDir::Older => (0..=from).rev().collect(),
            SearchDir::Newer => (from..self.entries.len()).collect(),
        };
        for index in indices {
            let entry = &self.entries[index];
            if skip_same == Some(entry.as_str()) {
                continue;
            }
            if let Some(byte_at) = entry.find(pattern) {
                let offset = entry[..byte_at].chars().count();
                return Some(SearchHit { index, offset });
            }
        }
        None
    }

    /// Write every entry, escaped, one per line. The file always ends with a
    /// single LF after the final entry.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&encode_entry(entry));
            out.push('\n');
        }
        fs::write(path, out)?;
        debug!(target: "history.io", entries = self.entries.len(), path = %path.display(), "saved");
        Ok(())
    }

    /// Load entries through the normal `add` path (duplicate collapse and
    /// the ring bound apply). A missing file loads as empty.
    pub fn load(&mut self, path: &Path) -> Result<(), HistoryError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        let mut pieces: Vec<&str> = text.split('\n').collect();
        // The piece after the final record separator is not an entry. Empty
        // pieces elsewhere are: an empty line is a valid (empty) entry.
        if pieces.last() == Some(&"") {
            pieces.pop();
        }
        for line in pieces {
            self.add(&decode_entry(line.trim_end_matches('\r')));
        }
        debug!(target: "history.io", entries = self.entries.len(), path = %path.display(), "loaded");
        Ok(())
    }
}
