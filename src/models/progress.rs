use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct LevelProgressRow {
    pub player_id: String,
    pub level: i32,
    pub completed: bool,
    pub best_score: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelRecord {
    pub level: u32,
    pub completed: bool,
    pub best_score: u32,
}

/// Which levels a player can open and how well they did on each
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProgress {
    pub player_id: String,
    /// Highest level the player may start; level 1 is always open
    pub unlocked_level: u32,
    /// One entry per level played to completion, sorted by level
    pub levels: Vec<LevelRecord>,
    /// Sum of best scores
    pub total_score: u64,
}

impl PlayerProgress {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            unlocked_level: 1,
            levels: Vec::new(),
            total_score: 0,
        }
    }

    pub fn from_rows(player_id: impl Into<String>, unlocked_level: i32, rows: &[LevelProgressRow]) -> Self {
        let mut levels: Vec<LevelRecord> = rows
            .iter()
            .map(|row| LevelRecord {
                level: u32::try_from(row.level).unwrap_or(0),
                completed: row.completed,
                best_score: u32::try_from(row.best_score).unwrap_or(0),
            })
            .collect();
        levels.sort_by_key(|r| r.level);

        let mut progress = Self {
            player_id: player_id.into(),
            unlocked_level: u32::try_from(unlocked_level).unwrap_or(1).max(1),
            levels,
            total_score: 0,
        };
        progress.total_score = progress.sum_best_scores();
        progress
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.unlocked_level
    }

    pub fn is_completed(&self, level: u32) -> bool {
        self.record(level).is_some_and(|r| r.completed)
    }

    pub fn best_score(&self, level: u32) -> u32 {
        self.record(level).map_or(0, |r| r.best_score)
    }

    /// Mark `level` as won with `score`: keeps the better score and opens
    /// the next level, up to `max_level`
    pub fn record_completion(&mut self, level: u32, score: u32, max_level: u32) {
        match self.levels.binary_search_by_key(&level, |r| r.level) {
            Ok(index) => {
                let record = &mut self.levels[index];
                record.completed = true;
                record.best_score = record.best_score.max(score);
            }
            Err(index) => self.levels.insert(
                index,
                LevelRecord {
                    level,
                    completed: true,
                    best_score: score,
                },
            ),
        }

        if level < max_level {
            self.unlocked_level = self.unlocked_level.max(level + 1);
        }
        self.total_score = self.sum_best_scores();
    }

    fn record(&self, level: u32) -> Option<&LevelRecord> {
        self.levels.iter().find(|r| r.level == level)
    }

    fn sum_best_scores(&self) -> u64 {
        self.levels.iter().map(|r| u64::from(r.best_score)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_has_level_one() {
        let progress = PlayerProgress::new("p1");
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
        assert!(!progress.is_unlocked(0));
        assert_eq!(progress.total_score, 0);
    }

    #[test]
    fn test_completion_unlocks_next_level() {
        let mut progress = PlayerProgress::new("p1");
        progress.record_completion(1, 120, 20);
        assert!(progress.is_completed(1));
        assert!(progress.is_unlocked(2));
        assert_eq!(progress.unlocked_level, 2);
    }

    #[test]
    fn test_best_score_is_kept() {
        let mut progress = PlayerProgress::new("p1");
        progress.record_completion(1, 300, 20);
        progress.record_completion(1, 100, 20);
        assert_eq!(progress.best_score(1), 300);

        progress.record_completion(2, 50, 20);
        assert_eq!(progress.total_score, 350);
        assert_eq!(progress.levels.len(), 2);
    }

    #[test]
    fn test_replaying_early_level_does_not_lower_unlock() {
        let mut progress = PlayerProgress::new("p1");
        for level in 1..=4 {
            progress.record_completion(level, 10, 20);
        }
        progress.record_completion(1, 10, 20);
        assert_eq!(progress.unlocked_level, 5);
    }

    #[test]
    fn test_last_level_unlocks_nothing_more() {
        let mut progress = PlayerProgress::new("p1");
        progress.unlocked_level = 20;
        progress.record_completion(20, 10, 20);
        assert_eq!(progress.unlocked_level, 20);
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            LevelProgressRow {
                player_id: "p1".to_string(),
                level: 2,
                completed: true,
                best_score: 40,
                updated_at: Utc::now(),
            },
            LevelProgressRow {
                player_id: "p1".to_string(),
                level: 1,
                completed: true,
                best_score: 60,
                updated_at: Utc::now(),
            },
        ];
        let progress = PlayerProgress::from_rows("p1", 3, &rows);
        assert_eq!(progress.levels[0].level, 1);
        assert_eq!(progress.total_score, 100);
        assert!(progress.is_unlocked(3));
    }
}
