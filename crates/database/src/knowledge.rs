//! Knowledge base storage.
//!
//! Entries are never hard-deleted: [`deactivate_entry`] flips `active` off and
//! the matcher only ever sees active rows.

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{KnowledgeEntry, KnowledgeFilter, KnowledgeUpdate, NewKnowledgeEntry};

const SELECT_ENTRY: &str = r#"
    SELECT id, question, answer, category, keywords, active, usage_count,
           created_by, created_at, updated_at
    FROM knowledge_entries
"#;

/// Trim keywords and drop empty or duplicate ones, keeping first occurrence order.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        if !out.iter().any(|k| k.to_lowercase() == keyword.to_lowercase()) {
            out.push(keyword.to_string());
        }
    }
    out
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Create a new knowledge entry.
pub async fn create_entry(
    pool: &SqlitePool,
    entry: &NewKnowledgeEntry,
    created_by: Option<&str>,
) -> Result<KnowledgeEntry> {
    let id = Uuid::new_v4().to_string();
    let keywords = normalize_keywords(&entry.keywords);

    sqlx::query(
        r#"
        INSERT INTO knowledge_entries (id, question, answer, category, keywords, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(entry.question.trim())
    .bind(entry.answer.trim())
    .bind(normalize_category(entry.category.as_deref()))
    .bind(Json(&keywords))
    .bind(created_by)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "KnowledgeEntry", &id))?;

    get_entry(pool, &id).await
}

/// Get a knowledge entry by ID, active or not.
pub async fn get_entry(pool: &SqlitePool, id: &str) -> Result<KnowledgeEntry> {
    sqlx::query_as::<_, KnowledgeEntry>(&format!("{SELECT_ENTRY} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "KnowledgeEntry",
            id: id.to_string(),
        })
}

/// List entries for the back office, grouped by category then question.
pub async fn list_entries(pool: &SqlitePool, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeEntry>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ENTRY);
    query.push(" WHERE 1 = 1");

    if !filter.include_inactive {
        query.push(" AND active = 1");
    }
    if let Some(category) = normalize_category(filter.category.as_deref()) {
        query.push(" AND category = ").push_bind(category);
    }
    query.push(" ORDER BY category IS NULL, category, question");

    let entries = query
        .build_query_as::<KnowledgeEntry>()
        .fetch_all(pool)
        .await?;

    Ok(entries)
}

/// All active entries, most used first.
///
/// Entries with the same usage count come back in creation (rowid) order.
pub async fn list_active_by_usage(pool: &SqlitePool) -> Result<Vec<KnowledgeEntry>> {
    let entries = sqlx::query_as::<_, KnowledgeEntry>(&format!(
        "{SELECT_ENTRY} WHERE active = 1 ORDER BY usage_count DESC, rowid ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Apply a partial update and return the updated entry.
pub async fn update_entry(
    pool: &SqlitePool,
    id: &str,
    update: &KnowledgeUpdate,
) -> Result<KnowledgeEntry> {
    let keywords = update.keywords.as_deref().map(normalize_keywords);
    // Some("") clears the category, None leaves it untouched.
    let category = update.category.as_deref().map(str::trim);

    let result = sqlx::query(
        r#"
        UPDATE knowledge_entries
        SET question = COALESCE(?, question),
            answer = COALESCE(?, answer),
            category = CASE WHEN ? IS NULL THEN category ELSE NULLIF(?, '') END,
            keywords = COALESCE(?, keywords),
            active = COALESCE(?, active),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(update.question.as_deref().map(str::trim))
    .bind(update.answer.as_deref().map(str::trim))
    .bind(category)
    .bind(category)
    .bind(keywords.map(Json))
    .bind(update.active)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "KnowledgeEntry",
            id: id.to_string(),
        });
    }

    get_entry(pool, id).await
}

/// Soft-delete an entry by clearing its `active` flag.
pub async fn deactivate_entry(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE knowledge_entries
        SET active = 0, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "KnowledgeEntry",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Atomically add one to an entry's usage counter.
pub async fn increment_usage(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE knowledge_entries
        SET usage_count = usage_count + 1
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "KnowledgeEntry",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Most used active entries as `(id, question, usage_count)`.
pub async fn top_entries(pool: &SqlitePool, limit: i64) -> Result<Vec<(String, String, i64)>> {
    let rows = sqlx::query_as::<_, (String, String, i64)>(
        r#"
        SELECT id, question, usage_count
        FROM knowledge_entries
        WHERE active = 1
        ORDER BY usage_count DESC, rowid ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count active entries.
pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM knowledge_entries WHERE active = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
