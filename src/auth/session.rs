//! Session tokens.
//!
//! A session maps an opaque token (a v4 UUID carried in the
//! `keystrike_session` cookie) to a signed-in user id. Two stores exist:
//! the `sessions` table, which survives restarts, and a process-local map.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "keystrike_session";

pub type SessionToken = String;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Bind a fresh token to `user_id`.
    async fn create(&self, user_id: i64) -> anyhow::Result<SessionToken>;
    async fn user_id(&self, token: &str) -> anyhow::Result<Option<i64>>;
    /// Removing an unknown token is not an error.
    async fn destroy(&self, token: &str) -> anyhow::Result<()>;
}

fn new_token() -> SessionToken {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct SqliteSessionStore {
    db: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, user_id: i64) -> anyhow::Result<SessionToken> {
        let token = new_token();
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
            .bind(&token)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        debug!(user_id, "session created");
        Ok(token)
    }

    async fn user_id(&self, token: &str) -> anyhow::Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.db)
            .await?;
        Ok(id)
    }

    async fn destroy(&self, token: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Sessions held in memory; lost on restart.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, i64>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64) -> anyhow::Result<SessionToken> {
        let token = new_token();
        self.sessions.write().await.insert(token.clone(), user_id);
        debug!(user_id, "session created");
        Ok(token)
    }

    async fn user_id(&self, token: &str) -> anyhow::Result<Option<i64>> {
        Ok(self.sessions.read().await.get(token).copied())
    }

    async fn destroy(&self, token: &str) -> anyhow::Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

/// Browser-session cookie: no max-age, so it ends when the browser closes.
pub fn set_session_cookie(cookies: &Cookies, token: SessionToken, secure: bool) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookies.add(cookie);
}

pub fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}
