use serde::{Deserialize, Serialize};

use crate::scores::services::ScoreOutcome;

/// Body of `POST /api/save_score`. Only `wpm` is required; numeric ranges
/// are not checked.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveScoreRequest {
    pub wpm: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveScoreResponse {
    pub max_wpm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl From<ScoreOutcome> for SaveScoreResponse {
    fn from(outcome: ScoreOutcome) -> Self {
        match outcome {
            ScoreOutcome::Guest { max_wpm } => Self {
                max_wpm,
                message: Some("Guest User"),
            },
            ScoreOutcome::Recorded { max_wpm } => Self {
                max_wpm,
                message: None,
            },
        }
    }
}
