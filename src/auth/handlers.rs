use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tower_cookies::Cookies;
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        errors::AuthError,
        extractors::SessionContext,
        services,
        session::{clear_session_cookie, set_session_cookie},
    },
    error::AppError,
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

/// Domain failures re-render the form with a flashed message; anything
/// else becomes a server error.
fn form_error(e: AuthError, render: fn(Option<&str>) -> String) -> Result<Response, AppError> {
    match e.user_message() {
        Some(msg) => Ok(Html(render(Some(msg))).into_response()),
        None => Err(AppError::Internal(e.into())),
    }
}

pub async fn register_page() -> Html<String> {
    Html(views::register_page(None))
}

#[instrument(skip(state, ctx, cookies, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    ctx: SessionContext,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match services::register(
        &state,
        ctx.token.as_deref(),
        &form.username,
        &form.password,
        &form.confirmation,
    )
    .await
    {
        Ok(token) => {
            set_session_cookie(&cookies, token, state.config.cookie_secure);
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => form_error(e, views::register_page),
    }
}

/// Showing the login form also signs the browser out.
#[instrument(skip(state, ctx, cookies))]
pub async fn login_page(
    State(state): State<AppState>,
    ctx: SessionContext,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    if ctx.token.is_some() {
        services::logout(&state, ctx.token.as_deref())
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        clear_session_cookie(&cookies);
    }
    Ok(Html(views::login_page(None)))
}

#[instrument(skip(state, ctx, cookies, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    ctx: SessionContext,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match services::login(&state, ctx.token.as_deref(), &form.username, &form.password).await {
        Ok(token) => {
            set_session_cookie(&cookies, token, state.config.cookie_secure);
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            if ctx.token.is_some() {
                clear_session_cookie(&cookies);
            }
            form_error(e, views::login_page)
        }
    }
}

#[instrument(skip(state, ctx, cookies))]
pub async fn logout(
    State(state): State<AppState>,
    ctx: SessionContext,
    cookies: Cookies,
) -> Result<Redirect, AppError> {
    services::logout(&state, ctx.token.as_deref())
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    if ctx.token.is_some() {
        clear_session_cookie(&cookies);
    }
    Ok(Redirect::to("/"))
}
