use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
    #[serde(alias = "expert")]
    Expert,
}

impl Difficulty {
    /// Difficulty tier a level number belongs to: five levels per tier
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=5 => Difficulty::Easy,
            6..=10 => Difficulty::Medium,
            11..=15 => Difficulty::Hard,
            _ => Difficulty::Expert,
        }
    }

    /// Level file holding the definitions for this tier
    pub fn file_name(self) -> &'static str {
        match self {
            Difficulty::Easy => "words_easy.json",
            Difficulty::Medium => "words_medium.json",
            Difficulty::Hard => "words_hard.json",
            Difficulty::Expert => "words_expert.json",
        }
    }
}

/// Definition of one level as stored in the level files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelData {
    pub level: u32,
    pub difficulty: Difficulty,
    #[serde(alias = "gridSize")]
    pub grid_size: usize,
    /// Seconds allowed to find every word
    #[serde(alias = "timeLimit")]
    pub time_limit: u32,
    pub words: Vec<String>,
}

impl LevelData {
    /// Used when a level has no definition on disk
    pub fn fallback(level: u32) -> Self {
        Self {
            level,
            difficulty: Difficulty::Easy,
            grid_size: 6,
            time_limit: 300,
            words: vec!["DEFAULT".to_string(), "WORD".to_string(), "LIST".to_string()],
        }
    }

    pub fn summary(&self) -> LevelSummary {
        LevelSummary {
            level: self.level,
            difficulty: self.difficulty,
            grid_size: self.grid_size,
            time_limit: self.time_limit,
            word_count: self.words.len(),
        }
    }
}

/// Public view of a level, without its word list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelSummary {
    pub level: u32,
    pub difficulty: Difficulty,
    pub grid_size: usize,
    pub time_limit: u32,
    pub word_count: usize,
}
