//! Application state shared across handlers.

use chatbot::{Authenticator, Matcher, TicketEscalation};
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Knowledge base matcher.
    pub matcher: Matcher<Database>,
    /// Ticket creation for the chat widget.
    pub escalation: TicketEscalation<Database>,
    /// Sign-in and bearer sessions.
    pub auth: Authenticator,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, auth: Authenticator) -> Self {
        Self {
            matcher: Matcher::new(db.clone()),
            escalation: TicketEscalation::new(db.clone()),
            db,
            auth,
        }
    }
}
