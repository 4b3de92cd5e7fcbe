mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

/// `/api/save_score`, open to guests.
pub fn router() -> Router<AppState> {
    handlers::api_routes()
}

/// Leaderboard and profile; callers put the auth gate in front.
pub fn protected_router() -> Router<AppState> {
    handlers::protected_routes()
}
