//! High score leaderboard system
//!
//! Persisted through [`Storage`], tracks the top 10 named scores plus the
//! single best score shown in the HUD.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player name
    pub player: String,
    /// Player's score
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    /// Best score ever reached on this device, named or not
    pub best: u64,
    /// Sorted descending by score, one entry per player
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    const STORAGE_KEY: &'static str = "highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Entry currently held by `player`
    pub fn entry_for(&self, player: &str) -> Option<&HighScoreEntry> {
        self.entries.iter().find(|e| e.player == player)
    }

    /// Record a finished run for `player`.
    ///
    /// A player keeps a single entry that only ever improves; a newcomer gets
    /// in when the score qualifies. Returns the rank achieved (1-indexed) or
    /// None if the leaderboard didn't change.
    pub fn submit(&mut self, player: &str, score: u64, timestamp: f64) -> Option<usize> {
        if score == 0 {
            return None;
        }

        match self.entries.iter().position(|e| e.player == player) {
            Some(i) if score <= self.entries[i].score => return None,
            Some(i) => {
                self.entries.remove(i);
            }
            None if !self.qualifies(score) => return None,
            None => {}
        }

        let entry = HighScoreEntry {
            player: player.to_string(),
            score,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("{} placed #{} with {}", player, rank, score);
        Some(rank)
    }

    /// Raise the best score. Returns whether it changed.
    pub fn record_best(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(storage: &Storage) -> Self {
        let scores: Self = storage.load_or_default(Self::STORAGE_KEY);
        log::info!("{} high scores, best {}", scores.entries.len(), scores.best);
        scores
    }

    pub fn save(&self, storage: &Storage) {
        storage.save_logged(Self::STORAGE_KEY, self);
    }
}

/// Format a timestamp as a relative date string
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_ms = (now - timestamp).max(0.0);
    let diff_secs = diff_ms / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else if days < 14 {
            "Last week".to_string()
        } else {
            format!("{} weeks ago", days / 7)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
