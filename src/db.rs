use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

/// Open the pool described by `url`, creating the database file if needed.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("parse database url {url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database lives exactly as long as its connection.
    let pool = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
    } else {
        SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
    };

    pool.context("connect to database")
}

pub async fn migrate(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Fresh migrated in-memory database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let db = connect("sqlite::memory:").await.expect("in-memory pool");
    migrate(&db).await.expect("migrations apply");
    db
}
