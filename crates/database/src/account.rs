//! Account CRUD operations.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Account, AccountRole, NewAccount};

/// Create a new account. Emails are stored trimmed and lower-cased.
pub async fn create_account(pool: &SqlitePool, account: &NewAccount) -> Result<Account> {
    let id = Uuid::new_v4().to_string();
    let email = account.email.trim().to_lowercase();

    sqlx::query(
        r#"
        INSERT INTO accounts (id, email, name, role, password_hash)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&email)
    .bind(account.name.trim())
    .bind(account.role)
    .bind(&account.password_hash)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Account", &email))?;

    get_account(pool, &id).await
}

/// Get an account by ID.
pub async fn get_account(pool: &SqlitePool, id: &str) -> Result<Account> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, name, role, password_hash, created_at
        FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Account",
        id: id.to_string(),
    })
}

/// Get an account by email (case-insensitive).
pub async fn get_account_by_email(pool: &SqlitePool, email: &str) -> Result<Account> {
    let email = email.trim().to_lowercase();

    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, name, role, password_hash, created_at
        FROM accounts
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Account",
        id: email.clone(),
    })
}

/// Change the role of an account.
pub async fn update_role(pool: &SqlitePool, id: &str, role: AccountRole) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET role = ?
        WHERE id = ?
        "#,
    )
    .bind(role)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Account",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete an account. Its sessions go with it; tickets and entries keep a null reference.
pub async fn delete_account(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Account",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all accounts ordered by name.
pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<Account>> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, name, role, password_hash, created_at
        FROM accounts
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}
