//! Knowledge matching.
//!
//! A query matches an active entry when the entry's question contains the
//! query (case-insensitive) or one of its keywords equals the query
//! (case-insensitive). Among matches the most used entry wins; equal usage
//! counts fall back to store order. There is no scoring beyond that.

use async_trait::async_trait;
use database::KnowledgeEntry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::KnowledgeBackend;
use crate::error::BackendError;

/// Answer given when nothing in the knowledge base matches.
pub const FALLBACK_ANSWER: &str = "Desculpe, não encontrei uma resposta para a sua pergunta. \
Deseja abrir um chamado para a nossa equipe de suporte?";

/// Answer given when the knowledge base could not be read.
pub const ERROR_ANSWER: &str =
    "Desculpe, ocorreu um erro ao processar a sua pergunta. Tente novamente em instantes.";

/// Result of a knowledge query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub answer: String,
    pub found: bool,
}

impl MatchOutcome {
    pub fn found(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            found: true,
        }
    }

    pub fn not_found() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            found: false,
        }
    }

    pub fn error() -> Self {
        Self {
            answer: ERROR_ANSWER.to_string(),
            found: false,
        }
    }
}

/// Anything that can answer a chat query.
///
/// The [`Matcher`] answers locally; a widget talking to the HTTP API would
/// implement this over the network, where the call itself can fail.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Answer a visitor's query.
    async fn respond(&self, query: &str) -> Result<MatchOutcome, BackendError>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Whether `entry` matches an already lower-cased, trimmed query.
pub fn entry_matches(entry: &KnowledgeEntry, query_lower: &str) -> bool {
    if !entry.active || query_lower.is_empty() {
        return false;
    }

    entry.question.to_lowercase().contains(query_lower)
        || entry
            .keywords
            .iter()
            .any(|keyword| keyword.trim().to_lowercase() == query_lower)
}

/// Pick the best entry for `query` from `entries`.
///
/// The highest `usage_count` wins; on a tie the entry that comes first in
/// `entries` is kept.
pub fn select_best<'a>(entries: &'a [KnowledgeEntry], query: &str) -> Option<&'a KnowledgeEntry> {
    let needle = query.trim().to_lowercase();

    entries
        .iter()
        .filter(|entry| entry_matches(entry, &needle))
        .fold(None, |best: Option<&KnowledgeEntry>, entry| match best {
            Some(current) if current.usage_count >= entry.usage_count => Some(current),
            _ => Some(entry),
        })
}

/// Answers queries from a knowledge store.
#[derive(Debug, Clone)]
pub struct Matcher<B> {
    backend: B,
}

impl<B: KnowledgeBackend> Matcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying store.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Answer a query. Never fails: store errors become [`ERROR_ANSWER`].
    ///
    /// A match bumps the winning entry's usage counter. The bump is
    /// best-effort and its failure does not change the answer.
    pub async fn query(&self, text: &str) -> MatchOutcome {
        let query = text.trim();
        if query.is_empty() {
            return MatchOutcome::not_found();
        }

        let entries = match self.backend.active_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "Failed to load knowledge entries");
                return MatchOutcome::error();
            }
        };

        let Some(entry) = select_best(&entries, query) else {
            debug!(query, candidates = entries.len(), "No knowledge entry matched");
            return MatchOutcome::not_found();
        };

        debug!(entry = %entry.id, usage = entry.usage_count, "Knowledge entry matched");

        if let Err(err) = self.backend.increment_usage(&entry.id).await {
            warn!(entry = %entry.id, error = %err, "Failed to record knowledge usage");
        }

        MatchOutcome::found(entry.answer.clone())
    }
}

#[async_trait]
impl<B: KnowledgeBackend> Responder for Matcher<B> {
    async fn respond(&self, query: &str) -> Result<MatchOutcome, BackendError> {
        Ok(self.query(query).await)
    }

    fn name(&self) -> &str {
        "Matcher"
    }
}
