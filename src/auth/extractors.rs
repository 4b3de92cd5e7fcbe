use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;
use tracing::{debug, warn};

use super::session::SESSION_COOKIE;
use crate::{error::AppError, state::AppState};

/// Request-scoped identity: the session token the browser presented and
/// the user it is bound to, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub token: Option<String>,
    pub user_id: Option<i64>,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<SessionContext>() {
            return Ok(ctx.clone());
        }

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;

        let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Ok(SessionContext::default());
        };

        let user_id = state
            .sessions
            .user_id(&token)
            .await
            .map_err(AppError::Internal)?;
        if user_id.is_none() {
            debug!("stale session cookie");
        }

        let ctx = SessionContext {
            token: Some(token),
            user_id,
        };
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

/// Signed-in user id, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(AppError::Unauthenticated)
    }
}

/// Gate for routes that need a signed-in user. Without one the request is
/// answered with a redirect to `/login` and the inner handler never runs.
pub async fn require_auth(
    ctx: SessionContext,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user_id) = ctx.user_id else {
        warn!(path = %req.uri().path(), "unauthenticated request rejected");
        return Err(AppError::Unauthenticated);
    };
    req.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(req).await)
}
