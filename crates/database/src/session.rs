//! Bearer session storage.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, Session};

/// Issue a new session token for an account.
pub async fn create_session(pool: &SqlitePool, account_id: &str) -> Result<Session> {
    let token = Uuid::new_v4().simple().to_string();

    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (token, account_id)
        VALUES (?, ?)
        RETURNING token, account_id, created_at
        "#,
    )
    .bind(&token)
    .bind(account_id)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Resolve a token to the account that owns it.
pub async fn get_session_account(pool: &SqlitePool, token: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT a.id, a.email, a.name, a.role, a.password_hash, a.created_at
        FROM sessions s
        JOIN accounts a ON a.id = s.account_id
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Delete a session.
///
/// Returns true if a session was deleted, false if the token was unknown.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = ?
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
