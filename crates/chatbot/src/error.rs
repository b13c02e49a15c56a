//! Error types for chatbot operations.

use database::{DatabaseError, ValidationError};
use thiserror::Error;

/// Failure reaching the knowledge or ticket store.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The database rejected or failed the operation.
    #[error("store error: {0}")]
    Database(#[from] DatabaseError),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from ticket creation.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Input rejected locally; nothing was sent to the store.
    #[error("invalid ticket: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed to save the ticket.
    #[error("ticket could not be saved: {0}")]
    Backend(#[from] BackendError),
}

/// Errors from driving a chat session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Submitted text was empty after trimming.
    #[error("message is empty")]
    EmptyMessage,

    /// A query is already awaiting its answer.
    #[error("a query is already in flight")]
    Busy,

    /// An answer arrived with no query in flight.
    #[error("no query is in flight")]
    NotAwaiting,

    /// The ticket form must be open to submit a ticket.
    #[error("ticket form is not open")]
    TicketFormClosed,

    /// Ticket input failed validation.
    #[error(transparent)]
    Ticket(#[from] TicketError),
}

/// Errors from login, logout and account registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The operation needs a signed-in identity.
    #[error("authentication required")]
    Unauthenticated,

    /// The identity lacks the required role.
    #[error("{0} role required")]
    Forbidden(&'static str),

    /// Registration input rejected.
    #[error("invalid account: {0}")]
    Validation(#[from] ValidationError),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The account store failed.
    #[error("account store error: {0}")]
    Database(#[from] DatabaseError),
}
