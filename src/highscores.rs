//! High score table
//!
//! Persisted as plain text, one `NAME SCORE` record per line, highest score
//! first (e.g. `AAA 30000`). Malformed lines are skipped; a missing or
//! unreadable file yields the default table.

use std::fs;
use std::path::Path;

use crate::consts::NUM_TRACKED_SCORES;
use crate::error::{ScoreFileError, ScoreLineError};

/// Maximum characters in a record name
pub const NAME_LEN: usize = 3;

/// A single score record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    /// Player initials (at most [`NAME_LEN`] characters, no whitespace)
    pub name: String,
    pub score: u64,
}

impl ScoreRecord {
    pub fn new(name: &str, score: u64) -> Self {
        Self {
            name: sanitize_name(name),
            score,
        }
    }

    /// Parse one `NAME SCORE` line
    pub fn parse_line(line: &str) -> Result<Self, ScoreLineError> {
        let mut fields = line.split_whitespace();
        let (name, score) = match (fields.next(), fields.next()) {
            (Some(name), Some(score)) => (name, score),
            (Some(_), None) => return Err(ScoreLineError::MissingField { found: 1 }),
            _ => return Err(ScoreLineError::MissingField { found: 0 }),
        };
        if let Some(extra) = fields.next() {
            return Err(ScoreLineError::ExtraField {
                field: extra.to_string(),
            });
        }
        // Older files may carry a signed score; negatives count as zero
        let score = score.parse::<i64>().map_err(|_| ScoreLineError::BadScore {
            value: score.to_string(),
        })?;
        Ok(Self::new(name, score.max(0) as u64))
    }
}

fn sanitize_name(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(NAME_LEN)
        .collect();
    if name.is_empty() { "???".to_string() } else { name }
}

/// Score table, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
    capacity: usize,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::with_defaults(NUM_TRACKED_SCORES)
    }
}

impl ScoreTable {
    /// Create an empty table
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// The placeholder table seeded when no score file exists
    pub fn with_defaults(capacity: usize) -> Self {
        let defaults = [
            ("AAA", 30_000),
            ("BBB", 20_000),
            ("CCC", 10_000),
            ("DDD", 9_000),
            ("EEE", 8_000),
        ];
        Self::from_records(
            defaults
                .iter()
                .map(|&(name, score)| ScoreRecord::new(name, score))
                .collect(),
            capacity,
        )
    }

    /// Build a table from arbitrary records (sorted and trimmed)
    pub fn from_records(mut records: Vec<ScoreRecord>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        // Stable sort keeps file order among equal scores
        records.sort_by(|a, b| b.score.cmp(&a.score));
        records.truncate(capacity);
        Self { records, capacity }
    }

    /// Parse score file contents, skipping malformed lines
    pub fn parse(text: &str, capacity: usize) -> Self {
        let mut records = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            match ScoreRecord::parse_line(line) {
                Ok(record) => records.push(record),
                Err(err) => log::warn!("Skipping score line {}: {}", line_no + 1, err),
            }
        }
        Self::from_records(records, capacity)
    }

    /// Render the table in the on-disk format
    pub fn to_file_string(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{} {}\n", r.name, r.score))
            .collect()
    }

    /// Read a score file
    pub fn try_load(path: &Path, capacity: usize) -> Result<Self, ScoreFileError> {
        let text = fs::read_to_string(path).map_err(|source| ScoreFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text, capacity))
    }

    /// Read a score file, seeding defaults when it is missing, unreadable or empty
    pub fn load(path: &Path, capacity: usize) -> Self {
        match Self::try_load(path, capacity) {
            Ok(table) if !table.is_empty() => {
                log::info!("Loaded {} high scores", table.records.len());
                table
            }
            Ok(_) => {
                log::warn!("No valid records in {}, using defaults", path.display());
                Self::with_defaults(capacity)
            }
            Err(err) => {
                log::warn!("{err}; using default scores");
                Self::with_defaults(capacity)
            }
        }
    }

    /// Write the table to disk
    pub fn save(&self, path: &Path) -> Result<(), ScoreFileError> {
        fs::write(path, self.to_file_string()).map_err(|source| ScoreFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("High scores saved ({} entries)", self.records.len());
        Ok(())
    }

    /// Records, highest first
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.records.len() < self.capacity {
            return true;
        }
        self.records.last().map(|r| score > r.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.records.iter().position(|r| score > r.score);
        Some(rank.unwrap_or(self.records.len()) + 1)
    }

    /// Insert a score if it qualifies, returning the rank achieved
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.records.insert(rank - 1, ScoreRecord::new(name, score));
        self.records.truncate(self.capacity);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.records.first().map(|r| r.score)
    }
}
