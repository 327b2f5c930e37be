//! AI value journal.
//!
//! Collects states whose empirical win rate crossed a high or low
//! threshold during learning, for later offline model training. The
//! journal is an in-memory interest map flushed once at shutdown: each
//! `(state, player)` pair contributes at most one row, labelled by its
//! last-seen classification.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Journal thresholds.
#[derive(Debug, Clone)]
pub struct JournalSettings {
    /// Values at or above this are labelled 1.
    pub high_threshold: f64,
    /// Values at or below this are labelled 0.
    pub low_threshold: f64,
    /// Minimum visits before a value is considered meaningful.
    pub visits_threshold: u64,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            low_threshold: 0.3,
            visits_threshold: 5,
        }
    }
}

/// Buffer of threshold-crossing states, flushed to a numbered text file.
#[derive(Debug)]
pub struct Journal {
    /// Tree name prefix; journal files are `<name>-aiDB-<N>.txt`.
    name: String,
    settings: JournalSettings,
    /// States are zero-padded to the board cell count on flush.
    state_len: usize,
    /// `(state, player)` → labelled high. Re-recording overwrites;
    /// mid-band values remove the entry.
    of_interest: BTreeMap<(String, String), bool>,
}

impl Journal {
    pub fn new(name: &str, settings: JournalSettings, state_len: usize) -> Self {
        Self {
            name: name.to_string(),
            settings,
            state_len,
            of_interest: BTreeMap::new(),
        }
    }

    /// Classify a freshly back-propagated value. `points` are real points
    /// (already halved from the doubled on-disk representation).
    pub fn record(&mut self, player: &str, state: &str, visits: u64, points: f64) {
        if visits < self.settings.visits_threshold {
            return;
        }

        let value = points / visits as f64;
        let key = (state.to_string(), player.to_string());

        if value >= self.settings.high_threshold {
            self.of_interest.insert(key, true);
        } else if value <= self.settings.low_threshold {
            self.of_interest.insert(key, false);
        } else {
            self.of_interest.remove(&key);
        }
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.of_interest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.of_interest.is_empty()
    }

    /// Write all buffered entries to the next numbered journal file and
    /// clear the buffer. Nothing is written when the buffer is empty.
    pub fn flush(&mut self) -> std::io::Result<Option<PathBuf>> {
        if self.of_interest.is_empty() {
            debug!("Journal empty, nothing to flush");
            return Ok(None);
        }

        let path = self.next_file_path()?;
        let mut out = BufWriter::new(File::create(&path)?);
        for ((state, player), high) in &self.of_interest {
            writeln!(
                out,
                "{},{:0>width$},{}",
                player,
                state,
                u8::from(*high),
                width = self.state_len
            )?;
        }
        out.flush()?;

        info!(
            file = %path.display(),
            entries = self.of_interest.len(),
            "Flushed AI journal"
        );
        self.of_interest.clear();

        Ok(Some(path))
    }

    /// Next journal file: one greater than the highest existing index, or
    /// 0 for a fresh name.
    fn next_file_path(&self) -> std::io::Result<PathBuf> {
        let path = Path::new(&self.name);
        let dir = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => Path::new("."),
        };
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone());
        let prefix = format!("{}-aiDB-", base);

        let mut next_index = 0u64;
        if dir.exists() {
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();
                if let Some(rest) = file_name
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(".txt"))
                {
                    if let Ok(index) = rest.parse::<u64>() {
                        next_index = next_index.max(index + 1);
                    }
                }
            }
        }

        Ok(dir.join(format!("{}{}.txt", prefix, next_index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal(dir: &tempfile::TempDir) -> Journal {
        let name = dir.path().join("tree").display().to_string();
        Journal::new(&name, JournalSettings::default(), 9)
    }

    #[test]
    fn below_visits_threshold_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        j.record("X", "12", 4, 4.0);
        assert!(j.is_empty());

        j.record("X", "12", 5, 5.0);
        assert_eq!(j.len(), 1);
    }

    #[test]
    fn visits_threshold_below_two_still_works() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("tree").display().to_string();
        let settings = JournalSettings {
            visits_threshold: 1,
            ..JournalSettings::default()
        };
        let mut j = Journal::new(&name, settings, 9);

        j.record("X", "1", 1, 1.0);
        assert_eq!(j.len(), 1);
    }

    #[test]
    fn classification_follows_the_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        j.record("X", "111", 10, 8.0); // 0.8 -> high
        j.record("Y", "222", 10, 2.0); // 0.2 -> low
        j.record("X", "121", 10, 5.0); // 0.5 -> mid-band, dropped
        assert_eq!(j.len(), 2);
    }

    #[test]
    fn last_classification_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        j.record("X", "111", 10, 8.0); // high
        j.record("X", "111", 20, 4.0); // 0.2 -> now low
        assert_eq!(j.len(), 1);

        // Sliding into the mid-band removes the entry entirely
        j.record("X", "111", 30, 15.0);
        assert!(j.is_empty());
    }

    #[test]
    fn flush_writes_padded_rows_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        j.record("X", "12", 10, 9.0);
        j.record("Y", "21", 10, 1.0);

        let path = j.flush().unwrap().expect("entries were buffered");
        assert!(j.is_empty());
        assert!(path.ends_with("tree-aiDB-0.txt"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["X,000000012,1", "Y,000000021,0"]);
    }

    #[test]
    fn flush_numbers_files_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        j.record("X", "1", 10, 9.0);
        let first = j.flush().unwrap().unwrap();
        assert!(first.ends_with("tree-aiDB-0.txt"));

        j.record("X", "2", 10, 9.0);
        let second = j.flush().unwrap().unwrap();
        assert!(second.ends_with("tree-aiDB-1.txt"));
    }

    #[test]
    fn empty_flush_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        assert_eq!(j.flush().unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn one_row_per_state_player_pair() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = journal(&dir);

        // The same state under both players is two distinct entries
        j.record("X", "12", 10, 9.0);
        j.record("Y", "12", 10, 9.0);
        assert_eq!(j.len(), 2);

        // Repeated high classifications stay a single entry
        j.record("X", "12", 20, 18.0);
        assert_eq!(j.len(), 2);
    }
}
