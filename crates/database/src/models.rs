//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Back-office role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AccountRole {
    /// Full access, including settings and hard deletes.
    Admin,
    /// Secretariat staff handling tickets and the knowledge base.
    Staff,
    /// School staff or citizen with a portal login.
    Member,
}

impl AccountRole {
    /// Whether this role may use back-office operations.
    pub fn is_staff(self) -> bool {
        matches!(self, AccountRole::Admin | AccountRole::Staff)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountRole::Admin => "admin",
            AccountRole::Staff => "staff",
            AccountRole::Member => "member",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(AccountRole::Admin),
            "staff" => Ok(AccountRole::Staff),
            "member" => Ok(AccountRole::Member),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A portal account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// UUID.
    pub id: String,
    /// Login email, unique.
    pub email: String,
    /// Display name.
    pub name: String,
    pub role: AccountRole,
    /// bcrypt hash, never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub role: AccountRole,
    pub password_hash: String,
}

/// A bearer session issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    pub account_id: String,
    pub created_at: String,
}

/// A question/answer record used to answer chatbot queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct KnowledgeEntry {
    /// UUID.
    pub id: String,
    /// Canonical question, matched by substring.
    pub question: String,
    /// Answer returned to the visitor.
    pub answer: String,
    /// Optional grouping label (e.g. "Matrícula", "Transporte").
    pub category: Option<String>,
    /// Keywords matched by exact (case-insensitive) equality.
    #[sqlx(json)]
    pub keywords: Vec<String>,
    /// Soft-delete flag.
    pub active: bool,
    /// Number of queries this entry has answered.
    pub usage_count: i64,
    /// Account that created the entry, if known.
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to create a knowledge entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewKnowledgeEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Partial update of a knowledge entry. `None` leaves a field untouched.
///
/// An empty `category` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub active: Option<bool>,
}

/// Listing filter for knowledge entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeFilter {
    pub category: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Lifecycle state of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Tickets only move forward; nothing returns to `open` and `closed` is final.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, Resolved)
                | (Open, Closed)
                | (InProgress, Resolved)
                | (InProgress, Closed)
                | (Resolved, Closed)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("unknown ticket status '{}'", s))
    }
}

/// Lowest ticket priority.
pub const PRIORITY_LOW: i64 = 1;
/// Default priority for tickets opened from the chat widget.
pub const PRIORITY_MEDIUM: i64 = 2;
pub const PRIORITY_HIGH: i64 = 3;
/// Highest ticket priority.
pub const PRIORITY_URGENT: i64 = 4;

/// A support request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SupportTicket {
    /// UUID.
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    /// Ordinal 1 (low) to 4 (urgent).
    pub priority: i64,
    /// Requester account; `None` for anonymous tickets.
    pub user_id: Option<String>,
    /// Staff account handling the ticket.
    pub assigned_to: Option<String>,
    /// School the request refers to, if any.
    pub school_id: Option<String>,
    /// Resolution notes written by staff.
    pub resolution: Option<String>,
    /// Set once, on the first transition to `resolved`.
    pub resolved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to insert a ticket. Status always starts as `open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub user_id: Option<String>,
    pub school_id: Option<String>,
}

/// Changes applied to a ticket in one write. `assigned_to: Some(None)`
/// clears the assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub status: Option<TicketStatus>,
    pub resolution: Option<String>,
    pub assigned_to: Option<Option<String>>,
    pub priority: Option<i64>,
}

impl TicketChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.resolution.is_none()
            && self.assigned_to.is_none()
            && self.priority.is_none()
    }
}

/// Listing filter for tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<i64>,
    pub school_id: Option<String>,
    pub assigned_to: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A message in a ticket thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TicketMessage {
    /// UUID.
    pub id: String,
    pub ticket_id: String,
    /// Author account; `None` for anonymous requesters.
    pub user_id: Option<String>,
    pub message: String,
    /// Hidden from the ticket's requester when set.
    pub is_internal: bool,
    pub created_at: String,
}

/// Chatbot and WhatsApp configuration (single row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatbotSettings {
    pub whatsapp_enabled: bool,
    /// Contact number in international format.
    pub whatsapp_number: Option<String>,
    /// Outbound notification webhook.
    pub webhook_url: Option<String>,
    /// First bot message of every chat session.
    pub welcome_message: String,
    /// "HH:MM", local time.
    pub business_hours_start: String,
    /// "HH:MM", local time.
    pub business_hours_end: String,
    /// Weekday numbers, 0 = Sunday.
    #[sqlx(json)]
    pub business_days: Vec<u8>,
    pub updated_by: Option<String>,
    pub updated_at: String,
}

/// Replacement values for [`ChatbotSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub whatsapp_enabled: bool,
    pub whatsapp_number: Option<String>,
    pub webhook_url: Option<String>,
    pub welcome_message: String,
    pub business_hours_start: String,
    pub business_hours_end: String,
    pub business_days: Vec<u8>,
}
