//! Ticket thread messages. Append-only.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::TicketMessage;

/// Append a message to a ticket thread and touch the ticket's `updated_at`.
pub async fn add_message(
    pool: &SqlitePool,
    ticket_id: &str,
    user_id: Option<&str>,
    message: &str,
    is_internal: bool,
) -> Result<TicketMessage> {
    let id = Uuid::new_v4().to_string();

    let inserted = sqlx::query_as::<_, TicketMessage>(
        r#"
        INSERT INTO ticket_messages (id, ticket_id, user_id, message, is_internal)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, ticket_id, user_id, message, is_internal, created_at
        "#,
    )
    .bind(&id)
    .bind(ticket_id)
    .bind(user_id)
    .bind(message.trim())
    .bind(is_internal)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::NotFound {
                    entity: "SupportTicket",
                    id: ticket_id.to_string(),
                };
            }
        }
        DatabaseError::from_insert(e, "TicketMessage", &id)
    })?;

    sqlx::query(
        r#"
        UPDATE support_tickets
        SET updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(ticket_id)
    .execute(pool)
    .await?;

    Ok(inserted)
}

/// List a ticket's messages in the order they were written.
///
/// Internal notes are left out unless `include_internal` is set.
pub async fn list_messages(
    pool: &SqlitePool,
    ticket_id: &str,
    include_internal: bool,
) -> Result<Vec<TicketMessage>> {
    let messages = sqlx::query_as::<_, TicketMessage>(
        r#"
        SELECT id, ticket_id, user_id, message, is_internal, created_at
        FROM ticket_messages
        WHERE ticket_id = ? AND (? OR is_internal = 0)
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(ticket_id)
    .bind(include_internal)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}
