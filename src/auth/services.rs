use tracing::{info, warn};

use crate::auth::{
    errors::{AuthError, Field},
    password::{hash_password, verify_password},
    repo_types::User,
    session::SessionToken,
};
use crate::state::AppState;

fn require(value: &str, field: Field) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::EmptyField(field));
    }
    Ok(())
}

/// Create an account and sign it in. `prior` is the token the browser
/// already held; it is replaced once the new session exists.
pub async fn register(
    state: &AppState,
    prior: Option<&str>,
    username: &str,
    password: &str,
    confirmation: &str,
) -> Result<SessionToken, AuthError> {
    let username = username.trim();
    require(username, Field::Username)?;
    require(password, Field::Password)?;
    if password != confirmation {
        return Err(AuthError::PasswordMismatch);
    }

    let hash = hash_password(password)?;

    let user = match User::create(&state.db, username, &hash).await {
        Ok(u) => u,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(username, "username already taken");
            return Err(AuthError::DuplicateUser);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(token) = prior {
        state.sessions.destroy(token).await.map_err(AuthError::Session)?;
    }
    let token = state
        .sessions
        .create(user.id)
        .await
        .map_err(AuthError::Session)?;

    info!(user_id = user.id, username = %user.name, "user registered");
    Ok(token)
}

/// Check credentials and open a new session. Whatever session the browser
/// held is destroyed first, whether or not the login succeeds.
pub async fn login(
    state: &AppState,
    prior: Option<&str>,
    username: &str,
    password: &str,
) -> Result<SessionToken, AuthError> {
    logout(state, prior).await?;

    let username = username.trim();
    require(username, Field::Username)?;
    require(password, Field::Password)?;

    let mut rows = User::find_by_name(&state.db, username).await?;
    if rows.len() != 1 {
        warn!(username, matches = rows.len(), "login unknown username");
        return Err(AuthError::UserNotFound);
    }
    let user = rows.remove(0);

    if !verify_password(password, &user.password_hash)? {
        warn!(username, user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidPassword);
    }

    let token = state
        .sessions
        .create(user.id)
        .await
        .map_err(AuthError::Session)?;

    info!(user_id = user.id, username = %user.name, "user logged in");
    Ok(token)
}

pub async fn logout(state: &AppState, token: Option<&str>) -> Result<(), AuthError> {
    if let Some(token) = token {
        state.sessions.destroy(token).await.map_err(AuthError::Session)?;
    }
    Ok(())
}
