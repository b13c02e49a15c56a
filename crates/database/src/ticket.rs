//! Support ticket storage and lifecycle.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{NewTicket, SupportTicket, TicketChanges, TicketFilter, TicketStatus};

const SELECT_TICKET: &str = r#"
    SELECT id, title, description, status, priority, user_id, assigned_to,
           school_id, resolution, resolved_at, created_at, updated_at
    FROM support_tickets
"#;

/// Default page size for ticket listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Insert a new ticket in the `open` state.
pub async fn create_ticket(pool: &SqlitePool, ticket: &NewTicket) -> Result<SupportTicket> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO support_tickets (id, title, description, status, priority, user_id, school_id)
        VALUES (?, ?, ?, 'open', ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(ticket.title.trim())
    .bind(ticket.description.trim())
    .bind(ticket.priority)
    .bind(ticket.user_id.as_deref())
    .bind(ticket.school_id.as_deref())
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "SupportTicket", &id))?;

    get_ticket(pool, &id).await
}

/// Get a ticket by ID.
pub async fn get_ticket(pool: &SqlitePool, id: &str) -> Result<SupportTicket> {
    sqlx::query_as::<_, SupportTicket>(&format!("{SELECT_TICKET} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "SupportTicket",
            id: id.to_string(),
        })
}

/// List tickets matching a filter, newest first.
pub async fn list_tickets(pool: &SqlitePool, filter: &TicketFilter) -> Result<Vec<SupportTicket>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_TICKET);
    query.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        query.push(" AND priority = ").push_bind(priority);
    }
    if let Some(school_id) = &filter.school_id {
        query.push(" AND school_id = ").push_bind(school_id.clone());
    }
    if let Some(assigned_to) = &filter.assigned_to {
        query.push(" AND assigned_to = ").push_bind(assigned_to.clone());
    }
    if let Some(user_id) = &filter.user_id {
        query.push(" AND user_id = ").push_bind(user_id.clone());
    }

    query
        .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
        .push_bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 500))
        .push(" OFFSET ")
        .push_bind(filter.offset.unwrap_or(0).max(0));

    let tickets = query
        .build_query_as::<SupportTicket>()
        .fetch_all(pool)
        .await?;

    Ok(tickets)
}

/// Apply status, resolution, assignee and priority changes in one transaction.
///
/// Rejects status moves the lifecycle does not allow. `resolved_at` is stamped
/// on the first move into `resolved` and kept afterwards. A non-empty
/// `resolution` replaces the stored resolution text. If any step fails no
/// change is kept.
pub async fn update_ticket(
    pool: &SqlitePool,
    id: &str,
    changes: &TicketChanges,
) -> Result<SupportTicket> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, SupportTicket>(&format!("{SELECT_TICKET} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "SupportTicket",
            id: id.to_string(),
        })?;

    if let Some(next) = changes.status {
        if !current.status.can_transition_to(next) {
            return Err(DatabaseError::InvalidTransition {
                id: id.to_string(),
                from: current.status,
                to: next,
            });
        }
    }

    if let Some(priority) = changes.priority {
        sqlx::query("UPDATE support_tickets SET priority = ? WHERE id = ?")
            .bind(priority)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(assigned_to) = &changes.assigned_to {
        sqlx::query("UPDATE support_tickets SET assigned_to = ? WHERE id = ?")
            .bind(assigned_to.as_deref())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    DatabaseError::NotFound {
                        entity: "Account",
                        id: assigned_to.clone().unwrap_or_default(),
                    }
                }
                other => DatabaseError::Sqlx(other),
            })?;
    }

    let next = changes.status.unwrap_or(current.status);
    let resolution = changes
        .resolution
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    // Guarding on the previous status keeps two concurrent transitions from both applying.
    let result = sqlx::query(
        r#"
        UPDATE support_tickets
        SET status = ?,
            resolution = COALESCE(?, resolution),
            resolved_at = CASE
                WHEN ? = 'resolved' THEN COALESCE(resolved_at, datetime('now'))
                ELSE resolved_at
            END,
            updated_at = datetime('now')
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next)
    .bind(resolution)
    .bind(next)
    .bind(id)
    .bind(current.status)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::InvalidTransition {
            id: id.to_string(),
            from: current.status,
            to: next,
        });
    }

    let updated = sqlx::query_as::<_, SupportTicket>(&format!("{SELECT_TICKET} WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    if next != current.status {
        tracing::debug!(ticket = %id, from = %current.status, to = %next, "Ticket status changed");
    }

    Ok(updated)
}

/// Hard-delete a ticket together with its thread.
pub async fn delete_ticket(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM support_tickets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "SupportTicket",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count tickets grouped by status. Statuses without tickets are omitted.
pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<(TicketStatus, i64)>> {
    let rows = sqlx::query_as::<_, (TicketStatus, i64)>(
        r#"
        SELECT status, COUNT(*) as count
        FROM support_tickets
        GROUP BY status
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
