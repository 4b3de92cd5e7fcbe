use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One completed typing test, as stored in `history`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attempt {
    pub id: i64,
    pub user_id: Option<i64>, // NULL never written; guests are not persisted
    pub wpm: f64,
    pub accuracy: Option<f64>,
    pub mode: Option<String>,
    pub timestamp: OffsetDateTime,
}

/// A leaderboard row. `accuracy` and `mode` belong to the attempt that
/// set `max_wpm`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub name: String,
    pub max_wpm: f64,
    pub accuracy: Option<f64>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StatsRow {
    pub max_wpm: Option<f64>,
    pub avg_wpm: Option<f64>,
    pub total_tests: i64,
}

/// Aggregates over all of a user's attempts. Both wpm figures are `None`
/// until the first test is saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub max_wpm: Option<f64>,
    pub avg_wpm: Option<i64>,
    pub total_tests: i64,
}

impl From<StatsRow> for ProfileStats {
    fn from(r: StatsRow) -> Self {
        Self {
            max_wpm: r.max_wpm,
            avg_wpm: r.avg_wpm.map(|avg| avg.round() as i64),
            total_tests: r.total_tests,
        }
    }
}
