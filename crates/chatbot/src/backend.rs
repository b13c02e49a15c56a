//! Store seams used by the matcher and ticket escalation.
//!
//! [`database::Database`] implements both traits; tests substitute an
//! in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use database::{knowledge, ticket, Database, KnowledgeEntry, NewTicket, SupportTicket};

use crate::error::BackendError;

/// Read access to the knowledge base plus the usage counter.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    /// All active entries, most used first, ties in store order.
    async fn active_entries(&self) -> Result<Vec<KnowledgeEntry>, BackendError>;

    /// Add one to an entry's usage counter.
    async fn increment_usage(&self, id: &str) -> Result<(), BackendError>;
}

/// Ticket insertion.
#[async_trait]
pub trait TicketBackend: Send + Sync {
    /// Insert a ticket in the `open` state.
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<SupportTicket, BackendError>;
}

#[async_trait]
impl KnowledgeBackend for Database {
    async fn active_entries(&self) -> Result<Vec<KnowledgeEntry>, BackendError> {
        Ok(knowledge::list_active_by_usage(self.pool()).await?)
    }

    async fn increment_usage(&self, id: &str) -> Result<(), BackendError> {
        Ok(knowledge::increment_usage(self.pool(), id).await?)
    }
}

#[async_trait]
impl TicketBackend for Database {
    async fn insert_ticket(&self, new_ticket: &NewTicket) -> Result<SupportTicket, BackendError> {
        Ok(ticket::create_ticket(self.pool(), new_ticket).await?)
    }
}

#[async_trait]
impl<T: KnowledgeBackend + ?Sized> KnowledgeBackend for Arc<T> {
    async fn active_entries(&self) -> Result<Vec<KnowledgeEntry>, BackendError> {
        (**self).active_entries().await
    }

    async fn increment_usage(&self, id: &str) -> Result<(), BackendError> {
        (**self).increment_usage(id).await
    }
}

#[async_trait]
impl<T: TicketBackend + ?Sized> TicketBackend for Arc<T> {
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<SupportTicket, BackendError> {
        (**self).insert_ticket(ticket).await
    }
}
