//! In-memory store for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use database::{KnowledgeEntry, NewTicket, SupportTicket, TicketStatus};
use uuid::Uuid;

use crate::backend::{KnowledgeBackend, TicketBackend};
use crate::error::BackendError;

/// Build an active entry with zero usage.
pub fn knowledge_entry(question: &str, answer: &str, keywords: &[&str]) -> KnowledgeEntry {
    KnowledgeEntry {
        id: Uuid::new_v4().to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
        category: None,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        active: true,
        usage_count: 0,
        created_by: None,
        created_at: "2026-03-01 12:00:00".to_string(),
        updated_at: "2026-03-01 12:00:00".to_string(),
    }
}

/// Knowledge and ticket store kept in memory, with switchable failures.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<KnowledgeEntry>>,
    tickets: Mutex<Vec<SupportTicket>>,
    fail_reads: AtomicBool,
    fail_increments: AtomicBool,
    fail_inserts: AtomicBool,
    increment_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<KnowledgeEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn tickets(&self) -> Vec<SupportTicket> {
        self.tickets.lock().unwrap().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn increment_calls(&self) -> usize {
        self.increment_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeBackend for MemoryBackend {
    async fn active_entries(&self) -> Result<Vec<KnowledgeEntry>, BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("reads disabled".to_string()));
        }

        let mut active: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.active)
            .cloned()
            .collect();
        // Stable sort keeps insertion order on ties, like the SQLite query.
        active.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        Ok(active)
    }

    async fn increment_usage(&self, id: &str) -> Result<(), BackendError> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("writes disabled".to_string()));
        }

        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.usage_count += 1;
                Ok(())
            }
            None => Err(BackendError::Unavailable(format!("unknown entry {}", id))),
        }
    }
}

#[async_trait]
impl TicketBackend for MemoryBackend {
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<SupportTicket, BackendError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("writes disabled".to_string()));
        }

        let stored = SupportTicket {
            id: Uuid::new_v4().to_string(),
            title: ticket.title.trim().to_string(),
            description: ticket.description.trim().to_string(),
            status: TicketStatus::Open,
            priority: ticket.priority,
            user_id: ticket.user_id.clone(),
            assigned_to: None,
            school_id: ticket.school_id.clone(),
            resolution: None,
            resolved_at: None,
            created_at: "2026-03-01 12:00:00".to_string(),
            updated_at: "2026-03-01 12:00:00".to_string(),
        };
        self.tickets.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}
