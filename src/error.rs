use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::views;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid request")]
    InvalidRequest,
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(anyhow::Error::new(e).context("database"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid Request" })),
            )
                .into_response(),
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response()
            }
            AppError::Internal(e) => {
                error!(error = ?e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
