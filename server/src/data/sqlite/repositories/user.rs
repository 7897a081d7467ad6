//! User repository for SQLite operations
//!
//! Covers credentials and the single active session per user.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewUser, UserRow, UserUpdate};

const SELECT_USER: &str = "SELECT u.id, u.username, u.password_hash, u.display_name, u.role_id, \
     r.name, u.access_token, u.token_expires_at \
     FROM users u LEFT JOIN roles r ON r.id = u.role_id";

type UserTuple = (
    i64,
    String,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<i64>,
);

fn to_row(
    (
        id,
        username,
        password_hash,
        display_name,
        role_id,
        role_name,
        access_token,
        token_expires_at,
    ): UserTuple,
) -> UserRow {
    UserRow {
        id,
        username,
        password_hash,
        display_name,
        role_id,
        role_name,
        access_token,
        token_expires_at,
    }
}

/// Create a new user; duplicate usernames become `Conflict`
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<UserRow, SqliteError> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, display_name, role_id) VALUES (?, ?, ?, ?)",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(user.role_id)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::conflict_on_unique(e, "Username already exists"))?;

    let id = result.last_insert_rowid();
    get_user(pool, id).await?.ok_or_else(|| {
        SqliteError::Database(sqlx::Error::RowNotFound)
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!("{} WHERE u.id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(to_row))
}

/// Get a user by username
pub async fn get_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!("{} WHERE u.username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(to_row))
}

/// Get the user currently holding `token`
pub async fn get_by_token(pool: &SqlitePool, token: &str) -> Result<Option<UserRow>, SqliteError> {
    let row =
        sqlx::query_as::<_, UserTuple>(&format!("{} WHERE u.access_token = ?", SELECT_USER))
            .bind(token)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(to_row))
}

/// List all users ordered by id
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, SqliteError> {
    let rows = sqlx::query_as::<_, UserTuple>(&format!("{} ORDER BY u.id", SELECT_USER))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(to_row).collect())
}

/// Update display name and/or role; unset fields keep their value
pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    update: &UserUpdate,
) -> Result<Option<UserRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE users SET display_name = COALESCE(?, display_name), role_id = COALESCE(?, role_id) WHERE id = ?",
    )
    .bind(&update.display_name)
    .bind(update.role_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_user(pool, id).await
}

/// Overwrite token and expiry together
pub async fn set_session(
    pool: &SqlitePool,
    id: i64,
    token: Option<&str>,
    expires_at: Option<i64>,
) -> Result<bool, SqliteError> {
    let result =
        sqlx::query("UPDATE users SET access_token = ?, token_expires_at = ? WHERE id = ?")
            .bind(token)
            .bind(expires_at)
            .bind(id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a user
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
