use sqlx::SqlitePool;

use crate::scores::repo_types::{Attempt, LeaderboardEntry, StatsRow};

/// Append one attempt. The store assigns `timestamp`.
pub async fn insert_attempt(
    db: &SqlitePool,
    user_id: i64,
    wpm: f64,
    accuracy: Option<f64>,
    mode: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO history (user_id, wpm, accuracy, mode)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(wpm)
    .bind(accuracy)
    .bind(mode)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Best wpm for `user_id` in `mode`. A missing mode matches only attempts
/// saved without one.
pub async fn max_wpm_for_mode(
    db: &SqlitePool,
    user_id: i64,
    mode: Option<&str>,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>(
        r#"
        SELECT MAX(wpm)
          FROM history
         WHERE user_id = ? AND mode IS ?
        "#,
    )
    .bind(user_id)
    .bind(mode)
    .fetch_one(db)
    .await
}

/// Each user's best attempt, highest first. Within a user, ties on wpm go
/// to the earliest attempt; across users, to the name.
pub async fn leaderboard(db: &SqlitePool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT u.name AS name, best.wpm AS max_wpm, best.accuracy AS accuracy, best.mode AS mode
          FROM (
                SELECT user_id, wpm, accuracy, mode,
                       ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY wpm DESC, id ASC) AS pos
                  FROM history
                 WHERE user_id IS NOT NULL
               ) AS best
          JOIN users u ON u.id = best.user_id
         WHERE best.pos = 1
         ORDER BY best.wpm DESC, u.name ASC
         LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn stats_for_user(db: &SqlitePool, user_id: i64) -> Result<StatsRow, sqlx::Error> {
    sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT MAX(wpm) AS max_wpm, AVG(wpm) AS avg_wpm, COUNT(id) AS total_tests
          FROM history
         WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}

/// Every attempt by `user_id`, newest first.
pub async fn history_for_user(db: &SqlitePool, user_id: i64) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(
        r#"
        SELECT id, user_id, wpm, accuracy, mode, timestamp
          FROM history
         WHERE user_id = ?
         ORDER BY timestamp DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

#[cfg(test)]
pub async fn count_attempts(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM history")
        .fetch_one(db)
        .await
}
