use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use crate::{db::queries, models::PlayerProgress};

/// Where player progress lives between games
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load(&self, player_id: &str) -> Result<PlayerProgress>;

    /// Record a won level and return the updated progress
    async fn record_completion(
        &self,
        player_id: &str,
        level: u32,
        score: u32,
    ) -> Result<PlayerProgress>;

    async fn reset(&self, player_id: &str) -> Result<()>;
}

/// Progress kept in process memory; lost on restart
pub struct MemoryProgressStore {
    players: DashMap<String, PlayerProgress>,
    max_level: u32,
}

impl MemoryProgressStore {
    pub fn new(max_level: u32) -> Self {
        Self {
            players: DashMap::new(),
            max_level,
        }
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self, player_id: &str) -> Result<PlayerProgress> {
        Ok(self
            .players
            .get(player_id)
            .map(|p| p.clone())
            .unwrap_or_else(|| PlayerProgress::new(player_id)))
    }

    async fn record_completion(
        &self,
        player_id: &str,
        level: u32,
        score: u32,
    ) -> Result<PlayerProgress> {
        let mut entry = self
            .players
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerProgress::new(player_id));
        entry.record_completion(level, score, self.max_level);
        Ok(entry.clone())
    }

    async fn reset(&self, player_id: &str) -> Result<()> {
        self.players.remove(player_id);
        Ok(())
    }
}

/// Progress stored in Postgres
pub struct PgProgressStore {
    pool: PgPool,
    max_level: u32,
}

impl PgProgressStore {
    pub fn new(pool: PgPool, max_level: u32) -> Self {
        Self { pool, max_level }
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn load(&self, player_id: &str) -> Result<PlayerProgress> {
        let unlocked = queries::get_unlocked_level(&self.pool, player_id).await?;
        let Some(unlocked) = unlocked else {
            return Ok(PlayerProgress::new(player_id));
        };
        let rows = queries::get_level_progress(&self.pool, player_id).await?;
        Ok(PlayerProgress::from_rows(player_id, unlocked, &rows))
    }

    async fn record_completion(
        &self,
        player_id: &str,
        level: u32,
        score: u32,
    ) -> Result<PlayerProgress> {
        let next = if level < self.max_level { level + 1 } else { level };
        queries::record_completion(
            &self.pool,
            player_id,
            i32::try_from(level)?,
            i32::try_from(score).unwrap_or(i32::MAX),
            i32::try_from(next)?,
        )
        .await?;
        self.load(player_id).await
    }

    async fn reset(&self, player_id: &str) -> Result<()> {
        queries::reset_progress(&self.pool, player_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_starts_fresh() {
        let store = MemoryProgressStore::new(20);
        let progress = tokio_test::block_on(store.load("alice")).unwrap();
        assert_eq!(progress, PlayerProgress::new("alice"));
    }

    #[test]
    fn test_memory_store_records_and_resets() {
        let store = MemoryProgressStore::new(20);

        let progress = tokio_test::block_on(store.record_completion("alice", 1, 250)).unwrap();
        assert_eq!(progress.unlocked_level, 2);
        assert_eq!(progress.total_score, 250);

        // Other players are unaffected
        let bob = tokio_test::block_on(store.load("bob")).unwrap();
        assert_eq!(bob.unlocked_level, 1);

        tokio_test::block_on(store.reset("alice")).unwrap();
        let progress = tokio_test::block_on(store.load("alice")).unwrap();
        assert_eq!(progress.unlocked_level, 1);
        assert!(progress.levels.is_empty());
    }

    #[test]
    fn test_memory_store_caps_unlock_at_max_level() {
        let store = MemoryProgressStore::new(2);
        tokio_test::block_on(store.record_completion("alice", 1, 10)).unwrap();
        let progress = tokio_test::block_on(store.record_completion("alice", 2, 10)).unwrap();
        assert_eq!(progress.unlocked_level, 2);
    }
}
