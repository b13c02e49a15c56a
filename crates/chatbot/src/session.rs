//! One chat widget conversation.
//!
//! A session alternates between [`SessionState::Idle`] and
//! [`SessionState::AwaitingResponse`]: [`ChatSession::submit`] records the
//! visitor's message and waits, [`ChatSession::resolve`] records the bot's
//! answer and goes back to idle. Only one query can be in flight at a time.
//! Whether the ticket form is visible is tracked separately.

use database::ChatbotSettings;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::backend::TicketBackend;
use crate::error::{BackendError, SessionError, TicketError};
use crate::escalation::{confirmation_message, TicketEscalation, TicketInput, TICKET_FAILED_MESSAGE};
use crate::matcher::{MatchOutcome, Responder};
use crate::message::{ChatMessage, MessageKind};

/// Greeting used when no settings are available.
pub const DEFAULT_WELCOME: &str =
    "Olá! Sou o assistente virtual da Secretaria de Educação. Como posso ajudar?";

/// Reply when the responder itself failed.
pub const APOLOGY_MESSAGE: &str =
    "Desculpe, estou com dificuldades para responder agora. Tente novamente em instantes.";

/// Round-trip state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// What happened to a ticket submitted from the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketSubmission {
    /// Saved; the form was closed.
    Created(database::SupportTicket),
    /// The store failed; the form stays open for another try.
    Failed,
}

/// In-memory conversation state for one widget instance.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: SessionState,
    showing_ticket_form: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// An empty session.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            state: SessionState::Idle,
            showing_ticket_form: false,
        }
    }

    /// A session opened with a greeting from the bot.
    pub fn with_welcome(welcome: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.messages.push(ChatMessage::bot(welcome));
        session
    }

    /// A session greeted with the configured welcome message.
    pub fn from_settings(settings: &ChatbotSettings) -> Self {
        let welcome = settings.welcome_message.trim();
        if welcome.is_empty() {
            Self::with_welcome(DEFAULT_WELCOME)
        } else {
            Self::with_welcome(welcome)
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the widget should accept input right now.
    pub fn can_submit(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn is_showing_ticket_form(&self) -> bool {
        self.showing_ticket_form
    }

    pub fn open_ticket_form(&mut self) {
        self.showing_ticket_form = true;
    }

    pub fn close_ticket_form(&mut self) {
        self.showing_ticket_form = false;
    }

    /// Offer suggested questions as quick-reply buttons.
    pub fn suggest<I, S>(&mut self, questions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for question in questions {
            self.messages
                .push(ChatMessage::bot_with_kind(question, MessageKind::QuickReply));
        }
    }

    /// Offer the WhatsApp contact card when WhatsApp is enabled and configured.
    ///
    /// Returns whether a card was added.
    pub fn offer_contact(&mut self, settings: &ChatbotSettings) -> bool {
        let number = match (&settings.whatsapp_number, settings.whatsapp_enabled) {
            (Some(number), true) if !number.trim().is_empty() => number.trim(),
            _ => return false,
        };

        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        self.messages.push(ChatMessage::bot_with_kind(
            format!("Fale com a nossa equipe pelo WhatsApp: https://wa.me/{}", digits),
            MessageKind::Contact,
        ));
        true
    }

    /// Record the visitor's message and start waiting for an answer.
    ///
    /// Returns the trimmed query to hand to the responder.
    pub fn submit(&mut self, text: &str) -> Result<String, SessionError> {
        if self.state == SessionState::AwaitingResponse {
            return Err(SessionError::Busy);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        self.messages.push(ChatMessage::user(text));
        self.state = SessionState::AwaitingResponse;
        Ok(text.to_string())
    }

    /// Record the answer to the in-flight query and go back to idle.
    ///
    /// Unanswered queries produce a `ticket` message that lets the visitor
    /// open the ticket form. A failed responder produces an apology.
    pub fn resolve(
        &mut self,
        outcome: Result<MatchOutcome, BackendError>,
    ) -> Result<&ChatMessage, SessionError> {
        if self.state != SessionState::AwaitingResponse {
            return Err(SessionError::NotAwaiting);
        }

        let reply = match outcome {
            Ok(MatchOutcome {
                answer,
                found: true,
            }) => ChatMessage::bot(answer),
            Ok(MatchOutcome {
                answer,
                found: false,
            }) => ChatMessage::bot_with_kind(answer, MessageKind::Ticket),
            Err(err) => {
                warn!(error = %err, "Chat responder failed");
                ChatMessage::bot(APOLOGY_MESSAGE)
            }
        };

        self.state = SessionState::Idle;
        self.messages.push(reply);
        let index = self.messages.len() - 1;
        Ok(&self.messages[index])
    }

    /// Submit a message, ask the responder, and record the answer.
    pub async fn send<R>(&mut self, responder: &R, text: &str) -> Result<&ChatMessage, SessionError>
    where
        R: Responder + ?Sized,
    {
        let query = self.submit(text)?;
        debug!(responder = responder.name(), "Answering chat query");
        let outcome = responder.respond(&query).await;
        self.resolve(outcome)
    }

    /// Submit the ticket form.
    ///
    /// Validation errors are returned as-is and leave the conversation
    /// untouched. A created ticket adds a confirmation and closes the form; a
    /// store failure adds an apology and keeps the form open.
    pub async fn submit_ticket<B: TicketBackend>(
        &mut self,
        escalation: &TicketEscalation<B>,
        input: &TicketInput,
        auth: &AuthContext,
    ) -> Result<TicketSubmission, SessionError> {
        if !self.showing_ticket_form {
            return Err(SessionError::TicketFormClosed);
        }

        match escalation.create_ticket(input, auth).await {
            Ok(ticket) => {
                self.messages.push(ChatMessage::bot(confirmation_message(&ticket)));
                self.showing_ticket_form = false;
                Ok(TicketSubmission::Created(ticket))
            }
            Err(TicketError::Backend(_)) => {
                self.messages.push(ChatMessage::bot(TICKET_FAILED_MESSAGE));
                Ok(TicketSubmission::Failed)
            }
            Err(err @ TicketError::Validation(_)) => Err(err.into()),
        }
    }
}
