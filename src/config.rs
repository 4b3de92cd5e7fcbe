use serde::Deserialize;

/// Where session tokens live.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// `sessions` table; survives restarts.
    Sqlite,
    /// Process memory; lost on restart.
    Memory,
}

impl std::str::FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "db" => Ok(Self::Sqlite),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown SESSION_STORE '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_backend: SessionBackend,
    pub cookie_secure: bool,
    pub leaderboard_limit: i64,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:keystrike.db?mode=rwc".into());
        let session_backend = match std::env::var("SESSION_STORE") {
            Ok(v) => v.parse()?,
            Err(_) => SessionBackend::Sqlite,
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            session_backend,
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            leaderboard_limit: std::env::var("LEADERBOARD_LIMIT")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()),
        })
    }

    /// In-memory database, in-memory sessions.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            session_backend: SessionBackend::Memory,
            cookie_secure: false,
            leaderboard_limit: 10,
            static_dir: "static".into(),
        }
    }
}
