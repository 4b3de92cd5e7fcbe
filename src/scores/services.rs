use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::auth::repo_types::{PublicUser, User};
use crate::scores::{
    dto::SaveScoreRequest,
    repo,
    repo_types::{Attempt, LeaderboardEntry, ProfileStats},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreOutcome {
    /// Not signed in; nothing stored, submitted wpm echoed back.
    Guest { max_wpm: f64 },
    /// Stored; best wpm for this user and mode including the new attempt.
    Recorded { max_wpm: f64 },
}

/// Store an attempt for a signed-in user and report their best in that
/// mode. Guests get their own score back and nothing is written.
pub async fn record_attempt(
    db: &SqlitePool,
    user_id: Option<i64>,
    req: &SaveScoreRequest,
) -> Result<ScoreOutcome, sqlx::Error> {
    let Some(user_id) = user_id else {
        debug!(wpm = req.wpm, "guest score not stored");
        return Ok(ScoreOutcome::Guest { max_wpm: req.wpm });
    };

    let mode = req.mode.as_deref();
    let id = repo::insert_attempt(db, user_id, req.wpm, req.accuracy, mode).await?;
    let max_wpm = repo::max_wpm_for_mode(db, user_id, mode)
        .await?
        .unwrap_or(req.wpm);

    info!(user_id, attempt_id = id, wpm = req.wpm, max_wpm, mode = ?mode, "attempt recorded");
    Ok(ScoreOutcome::Recorded { max_wpm })
}

pub async fn leaderboard(db: &SqlitePool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    repo::leaderboard(db, limit).await
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user: PublicUser,
    pub stats: ProfileStats,
    pub history: Vec<Attempt>,
}

/// `None` when `user_id` no longer names a user.
pub async fn profile(db: &SqlitePool, user_id: i64) -> Result<Option<Profile>, sqlx::Error> {
    let Some(user) = User::find_by_id(db, user_id).await? else {
        return Ok(None);
    };
    let stats = repo::stats_for_user(db, user_id).await?.into();
    let history = repo::history_for_user(db, user_id).await?;
    Ok(Some(Profile {
        user: user.into(),
        stats,
        history,
    }))
}
