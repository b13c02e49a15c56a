//! Chatbot core for the education portal.
//!
//! This crate holds the chat widget's behavior independent of any UI or
//! HTTP framework:
//!
//! - [`Matcher`] - answers free-text queries from the knowledge base
//! - [`ChatSession`] - one conversation's messages and round-trip state
//! - [`TicketEscalation`] - turns unanswered questions into support tickets
//! - [`AuthContext`] / [`Authenticator`] - explicit caller identity
//!
//! Stores are reached through [`KnowledgeBackend`] and [`TicketBackend`],
//! both implemented for [`database::Database`].
//!
//! # Example
//!
//! ```no_run
//! use chatbot::{AuthContext, ChatSession, Matcher, TicketEscalation, TicketInput};
//! use database::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite:chatbot.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let matcher = Matcher::new(db.clone());
//! let escalation = TicketEscalation::new(db.clone());
//! let mut session = ChatSession::new();
//!
//! let reply = session.send(&matcher, "matrícula").await?;
//! if reply.kind == chatbot::MessageKind::Ticket {
//!     session.open_ticket_form();
//!     let input = TicketInput::new("Matrícula", "Não encontrei a data de matrícula.", 2);
//!     session
//!         .submit_ticket(&escalation, &input, &AuthContext::anonymous())
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backend;
pub mod error;
pub mod escalation;
pub mod matcher;
pub mod message;
pub mod session;

#[cfg(test)]
mod mock;

pub use auth::{AuthContext, Authenticator, Identity};
pub use backend::{KnowledgeBackend, TicketBackend};
pub use error::{AuthError, BackendError, SessionError, TicketError};
pub use escalation::{TicketEscalation, TicketInput};
pub use matcher::{MatchOutcome, Matcher, Responder, ERROR_ANSWER, FALLBACK_ANSWER};
pub use message::{ChatMessage, MessageKind, Sender};
pub use session::{ChatSession, SessionState, TicketSubmission};

// Re-export async_trait for Responder implementors
pub use async_trait::async_trait;
