//! Support tickets: creation from the chat widget, back-office
//! administration and message threads.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chatbot::escalation::{confirmation_message, protocol_number};
use chatbot::{AuthContext, AuthError, TicketInput};
use database::validation::{validate_priority, validate_required, MAX_TEXT_LENGTH};
use database::{
    account, ticket, ticket_message, SupportTicket, TicketChanges, TicketFilter, TicketMessage,
    TicketStatus, ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::caller::Caller;
use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Response to a ticket opened through the widget.
#[derive(Debug, Serialize)]
pub struct TicketCreated {
    /// Short reference shown to the visitor.
    pub protocol: String,
    /// Chat confirmation text.
    pub message: String,
    pub ticket: SupportTicket,
}

/// A ticket with the messages its viewer may see.
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub messages: Vec<TicketMessage>,
}

/// Back-office changes to a ticket. At least one field is required.
///
/// An empty `assigned_to` clears the assignment. `resolution` is only
/// accepted together with a status change.
#[derive(Debug, Default, Deserialize)]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub resolution: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: Option<i64>,
}

impl TicketUpdate {
    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.resolution.is_none()
            && self.assigned_to.is_none()
            && self.priority.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    pub message: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Staff see every ticket matching the filter; members only their own.
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(mut filter): ApiQuery<TicketFilter>,
) -> Result<Json<Vec<SupportTicket>>> {
    let identity = caller.auth.require_identity()?;
    if !identity.role.is_staff() {
        filter.user_id = Some(identity.id.clone());
    }

    let tickets = ticket::list_tickets(state.db.pool(), &filter).await?;
    Ok(Json(tickets))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<TicketDetail>> {
    let ticket = visible_ticket(&state, &caller.auth, &id).await?;
    let messages =
        ticket_message::list_messages(state.db.pool(), &ticket.id, caller.auth.is_staff()).await?;

    Ok(Json(TicketDetail { ticket, messages }))
}

/// Open a ticket. Anonymous visitors are allowed.
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(input): ApiJson<TicketInput>,
) -> Result<(StatusCode, Json<TicketCreated>)> {
    let ticket = state.escalation.create_ticket(&input, &caller.auth).await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketCreated {
            protocol: protocol_number(&ticket),
            message: confirmation_message(&ticket),
            ticket,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<TicketUpdate>,
) -> Result<Json<SupportTicket>> {
    let identity = caller.auth.require_staff()?;
    let pool = state.db.pool();

    if update.is_empty() {
        return Err(ApiError::BadRequest("no changes requested".to_string()));
    }
    if update.resolution.is_some() && update.status.is_none() {
        return Err(ApiError::BadRequest(
            "resolution requires a status change".to_string(),
        ));
    }
    if let Some(priority) = update.priority {
        validate_priority(priority)?;
    }
    if let Some(resolution) = update.resolution.as_deref().filter(|r| !r.trim().is_empty()) {
        validate_required("resolution", resolution, MAX_TEXT_LENGTH)?;
    }

    let assigned_to = match update.assigned_to.as_deref().map(str::trim) {
        Some("") => Some(None),
        Some(account_id) => {
            let account = account::get_account(pool, account_id).await?;
            if !account.role.is_staff() {
                return Err(ValidationError::InvalidFormat {
                    field: "assigned_to".to_string(),
                    reason: "must be a staff account".to_string(),
                }
                .into());
            }
            Some(Some(account.id))
        }
        None => None,
    };

    let changes = TicketChanges {
        status: update.status,
        resolution: update.resolution,
        assigned_to,
        priority: update.priority,
    };
    let current = ticket::update_ticket(pool, &id, &changes).await?;

    info!(ticket = %current.id, by = %identity.id, status = %current.status, "Ticket updated");
    Ok(Json(current))
}

/// Hard delete; the thread goes with it.
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let identity = caller.auth.require_admin()?;

    ticket::delete_ticket(state.db.pool(), &id).await?;
    info!(ticket = %id, by = %identity.id, "Ticket deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Vec<TicketMessage>>> {
    let ticket = visible_ticket(&state, &caller.auth, &id).await?;
    let messages =
        ticket_message::list_messages(state.db.pool(), &ticket.id, caller.auth.is_staff()).await?;

    Ok(Json(messages))
}

/// Append to a thread. Only staff may post internal notes.
pub async fn add_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NewMessage>,
) -> Result<(StatusCode, Json<TicketMessage>)> {
    let ticket = visible_ticket(&state, &caller.auth, &id).await?;

    if body.is_internal && !caller.auth.is_staff() {
        return Err(AuthError::Forbidden("staff").into());
    }
    if ticket.status == TicketStatus::Closed {
        return Err(ApiError::Conflict(format!("ticket {} is closed", ticket.id)));
    }
    validate_required("message", &body.message, MAX_TEXT_LENGTH)?;

    let message = ticket_message::add_message(
        state.db.pool(),
        &ticket.id,
        caller.auth.user_id(),
        body.message.trim(),
        body.is_internal,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Load a ticket the caller may see: any ticket for staff, own tickets otherwise.
async fn visible_ticket(state: &AppState, auth: &AuthContext, id: &str) -> Result<SupportTicket> {
    let identity = auth.require_identity()?;
    let ticket = ticket::get_ticket(state.db.pool(), id).await?;

    if identity.role.is_staff() || ticket.user_id.as_deref() == Some(identity.id.as_str()) {
        Ok(ticket)
    } else {
        Err(AuthError::Forbidden("staff").into())
    }
}
