use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chatbot::Authenticator;
use clap::{Parser, Subcommand};
use database::validation::{
    validate_category, validate_keywords, validate_required, MAX_QUESTION_LENGTH, MAX_TEXT_LENGTH,
};
use database::{
    account, knowledge, Account, AccountRole, Database, DatabaseError, KnowledgeFilter,
    NewKnowledgeEntry,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "ingester")]
#[command(about = "Import knowledge base entries and create back-office accounts")]
struct Args {
    /// SQLite database URL
    #[arg(long, env = "SQLITE_PATH", default_value = "sqlite:chatbot.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import knowledge entries from a JSON array or JSON Lines file
    Knowledge {
        /// Input file
        #[arg(long)]
        file: PathBuf,

        /// Email of the account recorded as author
        #[arg(long)]
        created_by: Option<String>,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Create a back-office account
    Account {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        /// admin, staff or member
        #[arg(long, default_value = "staff")]
        role: AccountRole,

        /// Falls back to CHATBOT_ACCOUNT_PASSWORD env.
        #[arg(long, env = "CHATBOT_ACCOUNT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List accounts
    Accounts,

    /// Change an account's role
    SetRole {
        #[arg(long)]
        email: String,

        /// admin, staff or member
        #[arg(long)]
        role: AccountRole,
    },

    /// Delete an account and its sessions
    RemoveAccount {
        #[arg(long)]
        email: String,
    },
}

/// Outcome of a knowledge import.
#[derive(Debug, Default, PartialEq, Eq)]
struct ImportReport {
    imported: usize,
    duplicates: usize,
    invalid: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let db = Database::connect(&args.database_url).await?;
    db.migrate().await?;

    match args.command {
        Command::Knowledge {
            file,
            created_by,
            dry_run,
        } => {
            let text = fs::read_to_string(&file)?;
            let entries = parse_entries(&text)?;
            info!(file = %file.display(), entries = entries.len(), "Parsed knowledge file");

            if dry_run {
                let invalid = entries
                    .iter()
                    .enumerate()
                    .filter(|(index, entry)| check_entry(*index, entry).is_err())
                    .count();
                info!(invalid, "Dry run complete");
                return Ok(());
            }

            let author = match created_by {
                Some(email) => Some(account::get_account_by_email(db.pool(), &email).await?.id),
                None => None,
            };

            let report = import_entries(&db, &entries, author.as_deref()).await?;
            info!(
                imported = report.imported,
                duplicates = report.duplicates,
                invalid = report.invalid,
                "Knowledge import complete"
            );
        }
        Command::Account {
            email,
            name,
            role,
            password,
        } => {
            let identity = Authenticator::new(db.clone())
                .register(&email, &name, role, &password)
                .await?;
            info!(account = %identity.id, email = %identity.email, role = %identity.role, "Account created");
        }
        Command::Accounts => {
            for account in account::list_accounts(db.pool()).await? {
                println!("{}", account_line(&account));
            }
        }
        Command::SetRole { email, role } => {
            let account = set_role(&db, &email, role).await?;
            info!(account = %account.id, email = %account.email, role = %account.role, "Account role changed");
        }
        Command::RemoveAccount { email } => {
            let account = remove_account(&db, &email).await?;
            info!(account = %account.id, email = %account.email, "Account removed");
        }
    }

    db.close().await;
    Ok(())
}

/// Parse a JSON array of entries, or one entry per line (JSON Lines).
fn parse_entries(text: &str) -> Result<Vec<NewKnowledgeEntry>, String> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| format!("invalid JSON array: {}", e));
    }

    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = serde_json::from_str(line).map_err(|e| format!("line {}: {}", index + 1, e))?;
        entries.push(entry);
    }
    Ok(entries)
}

fn check_entry(index: usize, entry: &NewKnowledgeEntry) -> Result<(), String> {
    validate_required("question", &entry.question, MAX_QUESTION_LENGTH)
        .and_then(|_| validate_required("answer", &entry.answer, MAX_TEXT_LENGTH))
        .and_then(|_| validate_category(entry.category.as_deref()))
        .and_then(|_| validate_keywords(&entry.keywords))
        .map_err(|e| {
            warn!(entry = index + 1, error = %e, "Skipping invalid entry");
            e.to_string()
        })
}

fn account_line(account: &Account) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        account.email, account.role, account.name, account.created_at
    )
}

async fn set_role(db: &Database, email: &str, role: AccountRole) -> Result<Account, DatabaseError> {
    let account = account::get_account_by_email(db.pool(), email).await?;
    account::update_role(db.pool(), &account.id, role).await?;
    account::get_account(db.pool(), &account.id).await
}

async fn remove_account(db: &Database, email: &str) -> Result<Account, DatabaseError> {
    let account = account::get_account_by_email(db.pool(), email).await?;
    account::delete_account(db.pool(), &account.id).await?;
    Ok(account)
}

fn question_key(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Insert entries whose question is not already stored, active or not.
async fn import_entries(
    db: &Database,
    entries: &[NewKnowledgeEntry],
    created_by: Option<&str>,
) -> Result<ImportReport, DatabaseError> {
    let existing = knowledge::list_entries(
        db.pool(),
        &KnowledgeFilter {
            category: None,
            include_inactive: true,
        },
    )
    .await?;
    let mut seen: HashSet<String> = existing.iter().map(|e| question_key(&e.question)).collect();

    let mut report = ImportReport::default();
    for (index, entry) in entries.iter().enumerate() {
        if check_entry(index, entry).is_err() {
            report.invalid += 1;
            continue;
        }
        if !seen.insert(question_key(&entry.question)) {
            report.duplicates += 1;
            continue;
        }

        let created = knowledge::create_entry(db.pool(), entry, created_by).await?;
        info!(entry = %created.id, question = %created.question, "Imported knowledge entry");
        report.imported += 1;
    }

    Ok(report)
}
