//! Back-office dashboard statistics.

use axum::extract::State;
use axum::Json;
use database::{knowledge, ticket, TicketStatus};
use serde::Serialize;

use crate::caller::Caller;
use crate::error::Result;
use crate::state::AppState;

/// Number of most-used knowledge entries reported.
const TOP_ENTRIES: i64 = 5;

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub ticket_count: i64,
    pub tickets_by_status: Vec<StatusStats>,
    pub active_entry_count: i64,
    pub top_entries: Vec<EntryStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusStats {
    pub status: TicketStatus,
    pub ticket_count: i64,
}

/// Usage of a single knowledge entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryStats {
    pub id: String,
    pub question: String,
    pub usage_count: i64,
}

pub async fn stats(State(state): State<AppState>, caller: Caller) -> Result<Json<Stats>> {
    caller.auth.require_staff()?;
    let pool = state.db.pool();

    let counts = ticket::count_by_status(pool).await?;
    let active_entry_count = knowledge::count_active(pool).await?;
    let top = knowledge::top_entries(pool, TOP_ENTRIES).await?;

    // Every status is reported, zero when absent.
    let tickets_by_status: Vec<StatusStats> = TicketStatus::ALL
        .into_iter()
        .map(|status| StatusStats {
            status,
            ticket_count: counts
                .iter()
                .find(|(s, _)| *s == status)
                .map(|(_, count)| *count)
                .unwrap_or(0),
        })
        .collect();
    let ticket_count = tickets_by_status.iter().map(|s| s.ticket_count).sum();

    let top_entries = top
        .into_iter()
        .map(|(id, question, usage_count)| EntryStats {
            id,
            question,
            usage_count,
        })
        .collect();

    Ok(Json(Stats {
        ticket_count,
        tickets_by_status,
        active_entry_count,
        top_entries,
    }))
}
