//! User management and authentication queries

use crate::error::{timestamp, Result, StorageError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tunebox_core::types::{now, NewUser, User, UserCredentials, UserId};

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: UserId::new(row.try_get::<String, _>("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        created_at: timestamp(row.try_get("created_at")?)?,
    })
}

/// Create a user and store the password hash alongside it
///
/// Both rows are written in one transaction. A taken username or email
/// surfaces as [`StorageError::Duplicate`].
pub async fn create(pool: &SqlitePool, new_user: NewUser) -> Result<User> {
    let user = User {
        id: UserId::generate(),
        username: new_user.username,
        email: new_user.email,
        created_at: now(),
    };

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO users (id, username, email, created_at) VALUES (?, ?, ?, ?)")
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::unique_as_duplicate(e, "user already exists"))?;

    sqlx::query("INSERT INTO user_credentials (user_id, password_hash, updated_at) VALUES (?, ?, ?)")
        .bind(user.id.as_str())
        .bind(&new_user.password_hash)
        .bind(user.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(user)
}

/// Get a user with their password hash, looked up by email
pub async fn find_credentials_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserCredentials>> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.username, u.email, u.created_at, c.password_hash
        FROM users u
        INNER JOIN user_credentials c ON c.user_id = u.id
        WHERE u.email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(|row| {
        Ok(UserCredentials {
            user: user_from_row(&row)?,
            password_hash: row.try_get("password_hash")?,
        })
    })
    .transpose()
}

/// Whether the username or email is already registered
pub async fn username_or_email_taken(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE username = ? OR email = ?")
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(row.try_get::<i64, _>("count")? > 0)
}

/// Get all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT id, username, email, created_at FROM users ORDER BY username")
        .fetch_all(pool)
        .await?;

    rows.iter().map(user_from_row).collect()
}
