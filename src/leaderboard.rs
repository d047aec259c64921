//! Score hand-off and the local high score table
//!
//! The remote leaderboard lives behind an external uploader; this module only
//! builds the submission payload and parses the rows it returns. The local
//! top-10 table is persisted through a [`KeyValueStore`].

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistenceError, load_or_default, save_json};

/// Identifier the remote table files scores under
pub const GAME_ID: &str = "neon-storm";

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

const MAX_CALLSIGN_LEN: usize = 24;

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Enter a callsign")]
    EmptyCallsign,
    #[error("Callsign longer than {MAX_CALLSIGN_LEN} characters")]
    CallsignTooLong,
    #[error("Malformed leaderboard payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub username: String,
}

/// Body posted to the remote score endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub game_id: String,
    pub score: u64,
    pub metadata: SubmissionMetadata,
}

impl ScoreSubmission {
    /// Build a submission; the callsign is trimmed and must not be empty
    pub fn new(callsign: &str, score: u64) -> Result<Self, LeaderboardError> {
        let username = callsign.trim();
        if username.is_empty() {
            return Err(LeaderboardError::EmptyCallsign);
        }
        if username.chars().count() > MAX_CALLSIGN_LEN {
            return Err(LeaderboardError::CallsignTooLong);
        }
        Ok(Self {
            game_id: GAME_ID.to_string(),
            score,
            metadata: SubmissionMetadata {
                username: username.to_string(),
            },
        })
    }

    pub fn to_json(&self) -> Result<String, LeaderboardError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One row of the remote table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    #[serde(default = "unknown_username")]
    pub username: String,
    pub score: u64,
}

fn unknown_username() -> String {
    "Unknown".to_string()
}

/// Parse the remote table, best score first
pub fn parse_rows(json: &str) -> Result<Vec<LeaderboardRow>, LeaderboardError> {
    let mut rows: Vec<LeaderboardRow> = serde_json::from_str(json)?;
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(rows)
}

/// One display line per row, `1. NAME 1234`, capped at `limit` rows
pub fn format_rows(rows: &[LeaderboardRow], limit: usize) -> Vec<String> {
    rows.iter()
        .take(limit)
        .enumerate()
        .map(|(i, row)| format!("{}. {} {}", i + 1, row.username, row.score))
        .collect()
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Boss level reached
    pub boss_level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Local high score table
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub const STORAGE_KEY: &'static str = "neon_storm_highscores";

    /// Create empty table
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, boss_level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            boss_level,
            timestamp,
        };

        // Sorted descending; ties keep the earlier entry first
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

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut scores: Self = load_or_default(store, Self::STORAGE_KEY);
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), PersistenceError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_submission_payload() {
        let submission = ScoreSubmission::new("  ACE  ", 12_345).expect("valid");
        let json: serde_json::Value =
            serde_json::from_str(&submission.to_json().expect("json")).expect("parse");
        assert_eq!(json["gameId"], "neon-storm");
        assert_eq!(json["score"], 12_345);
        assert_eq!(json["metadata"]["username"], "ACE");
    }

    #[test]
    fn test_empty_callsign_rejected() {
        assert!(matches!(
            ScoreSubmission::new("   ", 10),
            Err(LeaderboardError::EmptyCallsign)
        ));
        assert!(matches!(
            ScoreSubmission::new(&"X".repeat(25), 10),
            Err(LeaderboardError::CallsignTooLong)
        ));
    }

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(r#"[{"username":"B","score":5},{"score":99999},{"username":"A","score":70}]"#)
            .expect("rows");
        assert_eq!(rows[0].username, "Unknown");
        assert_eq!(rows[1].score, 70);
        assert!(parse_rows("{}").is_err());
    }

    #[test]
    fn test_format_rows() {
        let rows = parse_rows(r#"[{"username":"B","score":5},{"username":"A","score":70}]"#)
            .expect("rows");
        assert_eq!(format_rows(&rows, 10), vec!["1. A 70", "2. B 5"]);
        assert_eq!(format_rows(&rows, 1).len(), 1);
        assert!(format_rows(&[], 10).is_empty());
    }

    #[test]
    fn test_table_order_and_cap() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0, 1, 0.0), None);
        for i in 1..=12u64 {
            scores.add_score(i * 100, 1, i as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries[0].score, 1200);
        assert!(!scores.qualifies(300));
        assert_eq!(scores.add_score(1150, 1, 13.0), Some(2));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(400));
    }

    #[test]
    fn test_ties_keep_earlier_entry() {
        let mut scores = HighScores::new();
        scores.add_score(500, 1, 1.0);
        assert_eq!(scores.add_score(500, 2, 2.0), Some(2));
        assert_eq!(scores.entries[0].timestamp, 1.0);
    }

    #[test]
    fn test_persisted_table() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.add_score(15_000, 2, 10.0);
        scores.save(&mut store).expect("save");
        let loaded = HighScores::load(&store);
        assert_eq!(loaded.entries, scores.entries);
    }
}
