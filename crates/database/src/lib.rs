//! SQLite persistence layer for the education portal chatbot.
//!
//! This crate provides async database operations for the knowledge base,
//! support tickets and their threads, chatbot settings, and back-office
//! accounts using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{knowledge, Database, NewKnowledgeEntry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:chatbot.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Add a knowledge entry
//!     let entry = NewKnowledgeEntry {
//!         question: "Como funciona a matrícula?".to_string(),
//!         answer: "A matrícula é feita online no portal.".to_string(),
//!         category: Some("Matrícula".to_string()),
//!         keywords: vec!["matrícula".to_string()],
//!     };
//!     knowledge::create_entry(db.pool(), &entry, None).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod error;
pub mod knowledge;
pub mod models;
pub mod session;
pub mod settings;
pub mod ticket;
pub mod ticket_message;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    Account, AccountRole, ChatbotSettings, KnowledgeEntry, KnowledgeFilter, KnowledgeUpdate,
    NewAccount, NewKnowledgeEntry, NewTicket, Session, SettingsUpdate, SupportTicket,
    TicketChanges, TicketFilter, TicketMessage, TicketStatus,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/chatbot.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
