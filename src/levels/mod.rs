use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::{
    models::{Difficulty, LevelData, LevelSummary},
    utils::letters::{normalize_word, strip_to_letters},
};

/// Layout of a level file: `{"levels": [...]}`
#[derive(Debug, Deserialize)]
struct LevelFile {
    levels: Vec<LevelData>,
}

/// All playable levels, numbered 1 to `max_level`
pub struct LevelCatalog {
    levels: BTreeMap<u32, LevelData>,
    max_level: u32,
}

impl LevelCatalog {
    /// Load the level files of every difficulty tier from `dir`.
    /// Missing or malformed files are skipped with a warning.
    pub async fn load<P: AsRef<Path>>(dir: P, max_level: u32) -> Result<Self> {
        let dir = dir.as_ref();
        fs::metadata(dir)
            .await
            .with_context(|| format!("Level directory {} is not readable", dir.display()))?;

        let mut catalog = Self::empty(max_level);

        for difficulty in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ] {
            let path = dir.join(difficulty.file_name());
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping level file {}: {}", path.display(), e);
                    continue;
                }
            };

            match Self::parse(&content) {
                Ok(levels) => {
                    for level in levels {
                        if Difficulty::for_level(level.level) != difficulty {
                            tracing::warn!(
                                "Level {} is defined in {}, expected {}",
                                level.level,
                                difficulty.file_name(),
                                Difficulty::for_level(level.level).file_name()
                            );
                        }
                        catalog.insert(level);
                    }
                }
                Err(e) => tracing::warn!("Skipping level file {}: {:#}", path.display(), e),
            }
        }

        tracing::info!("Loaded {} level definitions", catalog.len());

        Ok(catalog)
    }

    /// Create a catalog with no definitions; every level uses the fallback
    pub fn empty(max_level: u32) -> Self {
        Self {
            levels: BTreeMap::new(),
            max_level,
        }
    }

    pub fn from_levels(levels: Vec<LevelData>, max_level: u32) -> Self {
        let mut catalog = Self::empty(max_level);
        for level in levels {
            catalog.insert(level);
        }
        catalog
    }

    /// Parse the contents of one level file
    pub fn parse(content: &str) -> Result<Vec<LevelData>> {
        let file: LevelFile = serde_json::from_str(content).context("Invalid level file")?;
        Ok(file.levels)
    }

    fn insert(&mut self, mut level: LevelData) {
        if level.level == 0 || level.level > self.max_level {
            tracing::warn!("Ignoring level {} outside 1..={}", level.level, self.max_level);
            return;
        }
        if level.grid_size == 0 {
            tracing::warn!("Ignoring level {} with an empty grid", level.level);
            return;
        }

        let number = level.level;
        level.words = level
            .words
            .iter()
            .filter_map(|raw| {
                let word = strip_to_letters(raw);
                match &word {
                    None => tracing::warn!("Level {}: dropping word {:?} with no letters", number, raw),
                    Some(w) if Some(w) != normalize_word(raw).as_ref() => {
                        tracing::warn!("Level {}: word {:?} stored as {}", number, raw, w)
                    }
                    Some(_) => {}
                }
                word
            })
            .collect();

        self.levels.insert(level.level, level);
    }

    /// Definition of `level`, or the fallback level if it has none.
    /// None for numbers outside 1..=max_level.
    pub fn level(&self, level: u32) -> Option<LevelData> {
        if level == 0 || level > self.max_level {
            return None;
        }
        Some(
            self.levels
                .get(&level)
                .cloned()
                .unwrap_or_else(|| LevelData::fallback(level)),
        )
    }

    pub fn summaries(&self) -> Vec<LevelSummary> {
        (1..=self.max_level)
            .filter_map(|n| self.level(n))
            .map(|level| level.summary())
            .collect()
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Number of levels defined on disk
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
