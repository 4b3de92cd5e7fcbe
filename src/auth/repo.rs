use crate::auth::repo_types::User;
use sqlx::SqlitePool;

impl User {
    /// All users stored under `name`. More than one row means the unique
    /// index is missing, which callers treat as a failed lookup.
    pub async fn find_by_name(db: &SqlitePool, name: &str) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, password_hash, created_at
            FROM users
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. A taken name fails with a unique-violation
    /// database error.
    pub async fn create(db: &SqlitePool, name: &str, password_hash: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, password_hash)
            VALUES (?, ?)
            RETURNING id, name, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}
