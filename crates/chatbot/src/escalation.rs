//! Ticket escalation for queries the knowledge base could not answer.

use database::models::PRIORITY_MEDIUM;
use database::validation::{
    validate_priority, validate_required, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH,
};
use database::{NewTicket, SupportTicket, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::backend::TicketBackend;
use crate::error::TicketError;

/// Chat reply after a ticket was created. `{id}` is replaced by the protocol number.
pub const TICKET_CREATED_TEMPLATE: &str = "Seu chamado foi aberto com sucesso! \
Protocolo: {id}. Nossa equipe entrará em contato em breve.";

/// Chat reply when the ticket could not be saved.
pub const TICKET_FAILED_MESSAGE: &str =
    "Desculpe, não foi possível abrir o chamado agora. Tente novamente em instantes.";

fn default_priority() -> i64 {
    PRIORITY_MEDIUM
}

/// What the ticket form collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInput {
    pub title: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub school_id: Option<String>,
}

impl TicketInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>, priority: i64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            school_id: None,
        }
    }

    pub fn with_school(mut self, school_id: impl Into<String>) -> Self {
        self.school_id = Some(school_id.into());
        self
    }

    /// Check the input without touching any store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("title", &self.title, MAX_TITLE_LENGTH)?;
        validate_required("description", &self.description, MAX_TEXT_LENGTH)?;
        validate_priority(self.priority)?;
        Ok(())
    }
}

/// Protocol number shown to the visitor: the first block of the ticket UUID.
pub fn protocol_number(ticket: &SupportTicket) -> String {
    ticket
        .id
        .split('-')
        .next()
        .unwrap_or(&ticket.id)
        .to_uppercase()
}

/// Confirmation text for a created ticket.
pub fn confirmation_message(ticket: &SupportTicket) -> String {
    TICKET_CREATED_TEMPLATE.replace("{id}", &protocol_number(ticket))
}

/// Creates support tickets on behalf of the chat widget.
#[derive(Debug, Clone)]
pub struct TicketEscalation<B> {
    backend: B,
}

impl<B: TicketBackend> TicketEscalation<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate and insert a ticket in the `open` state.
    ///
    /// The requester is the identity in `auth`; anonymous visitors get a
    /// ticket with no `user_id`. Invalid input never reaches the store.
    pub async fn create_ticket(
        &self,
        input: &TicketInput,
        auth: &AuthContext,
    ) -> Result<SupportTicket, TicketError> {
        input.validate()?;

        let school_id = input
            .school_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let new_ticket = NewTicket {
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            priority: input.priority,
            user_id: auth.user_id().map(str::to_string),
            school_id,
        };

        match self.backend.insert_ticket(&new_ticket).await {
            Ok(ticket) => {
                info!(
                    ticket = %ticket.id,
                    priority = ticket.priority,
                    anonymous = ticket.user_id.is_none(),
                    "Support ticket opened"
                );
                Ok(ticket)
            }
            Err(err) => {
                warn!(error = %err, "Failed to open support ticket");
                Err(err.into())
            }
        }
    }
}
