use sqlx::{PgPool, Result};

use crate::models::LevelProgressRow;

// Player queries
pub async fn get_unlocked_level(pool: &PgPool, player_id: &str) -> Result<Option<i32>> {
    sqlx::query_scalar::<_, i32>("SELECT unlocked_level FROM players WHERE player_id = $1")
        .bind(player_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_level_progress(pool: &PgPool, player_id: &str) -> Result<Vec<LevelProgressRow>> {
    sqlx::query_as::<_, LevelProgressRow>(
        r#"
        SELECT player_id, level, completed, best_score, updated_at
        FROM level_progress
        WHERE player_id = $1
        ORDER BY level
        "#,
    )
    .bind(player_id)
    .fetch_all(pool)
    .await
}

/// Mark a level as completed, keeping the best score, and raise the
/// player's unlocked level to at least `unlocked_level`
pub async fn record_completion(
    pool: &PgPool,
    player_id: &str,
    level: i32,
    score: i32,
    unlocked_level: i32,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO players (player_id, unlocked_level)
        VALUES ($1, $2)
        ON CONFLICT (player_id)
        DO UPDATE SET
            unlocked_level = GREATEST(players.unlocked_level, EXCLUDED.unlocked_level),
            updated_at = NOW()
        "#,
    )
    .bind(player_id)
    .bind(unlocked_level)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO level_progress (player_id, level, completed, best_score)
        VALUES ($1, $2, TRUE, $3)
        ON CONFLICT (player_id, level)
        DO UPDATE SET
            completed = TRUE,
            best_score = GREATEST(level_progress.best_score, EXCLUDED.best_score),
            updated_at = NOW()
        "#,
    )
    .bind(player_id)
    .bind(level)
    .bind(score)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Recorded level {} for player {} (score {})", level, player_id, score);

    Ok(())
}

/// Forget everything about a player; their level rows go with them
pub async fn reset_progress(pool: &PgPool, player_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM players WHERE player_id = $1")
        .bind(player_id)
        .execute(pool)
        .await?;

    Ok(())
}
