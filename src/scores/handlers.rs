use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::extractors::{CurrentUser, SessionContext},
    error::AppError,
    state::AppState,
    views,
};

use super::{
    dto::{SaveScoreRequest, SaveScoreResponse},
    services,
};

/// Routes open to guests.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/api/save_score", post(save_score))
}

/// Routes that expect `require_auth` in front of them.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/profile", get(profile))
}

#[instrument(skip(state, ctx, payload), fields(user_id = ?ctx.user_id))]
pub async fn save_score(
    State(state): State<AppState>,
    ctx: SessionContext,
    payload: Result<Json<SaveScoreRequest>, JsonRejection>,
) -> Result<Json<SaveScoreResponse>, AppError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "rejected score payload");
        AppError::InvalidRequest
    })?;

    let outcome = services::record_attempt(&state.db, ctx.user_id, &req).await?;
    Ok(Json(outcome.into()))
}

#[instrument(skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> Result<Html<String>, AppError> {
    let entries = services::leaderboard(&state.db, state.config.leaderboard_limit).await?;
    Ok(Html(views::leaderboard_page(&entries)))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Html<String>, AppError> {
    let Some(profile) = services::profile(&state.db, user_id).await? else {
        // session outlived its user
        warn!(user_id, "profile requested for missing user");
        return Err(AppError::Unauthenticated);
    };
    Ok(Html(views::profile_page(&profile)))
}
