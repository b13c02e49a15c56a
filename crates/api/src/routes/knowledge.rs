//! Knowledge base administration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::validation::{
    validate_category, validate_keywords, validate_required, MAX_QUESTION_LENGTH, MAX_TEXT_LENGTH,
};
use database::{
    knowledge, DatabaseError, KnowledgeEntry, KnowledgeFilter, KnowledgeUpdate, NewKnowledgeEntry,
};
use tracing::info;

use crate::caller::Caller;
use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// List entries. Only staff may ask for inactive ones.
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(filter): ApiQuery<KnowledgeFilter>,
) -> Result<Json<Vec<KnowledgeEntry>>> {
    if filter.include_inactive {
        caller.auth.require_staff()?;
    }

    let entries = knowledge::list_entries(state.db.pool(), &filter).await?;
    Ok(Json(entries))
}

/// Fetch one entry. Inactive entries are hidden from non-staff callers.
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<KnowledgeEntry>> {
    let entry = knowledge::get_entry(state.db.pool(), &id).await?;

    if !entry.active && !caller.auth.is_staff() {
        return Err(DatabaseError::NotFound {
            entity: "KnowledgeEntry",
            id,
        }
        .into());
    }

    Ok(Json(entry))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(entry): ApiJson<NewKnowledgeEntry>,
) -> Result<(StatusCode, Json<KnowledgeEntry>)> {
    let identity = caller.auth.require_staff()?;

    validate_required("question", &entry.question, MAX_QUESTION_LENGTH)?;
    validate_required("answer", &entry.answer, MAX_TEXT_LENGTH)?;
    validate_category(entry.category.as_deref())?;
    validate_keywords(&entry.keywords)?;

    let created = knowledge::create_entry(state.db.pool(), &entry, Some(&identity.id)).await?;
    info!(entry = %created.id, by = %identity.id, "Knowledge entry created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update; absent fields are left as they are.
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<KnowledgeUpdate>,
) -> Result<Json<KnowledgeEntry>> {
    let identity = caller.auth.require_staff()?;

    if let Some(question) = &update.question {
        validate_required("question", question, MAX_QUESTION_LENGTH)?;
    }
    if let Some(answer) = &update.answer {
        validate_required("answer", answer, MAX_TEXT_LENGTH)?;
    }
    validate_category(update.category.as_deref())?;
    if let Some(keywords) = &update.keywords {
        validate_keywords(keywords)?;
    }

    let entry = knowledge::update_entry(state.db.pool(), &id, &update).await?;
    info!(entry = %entry.id, by = %identity.id, "Knowledge entry updated");

    Ok(Json(entry))
}

/// Soft delete: the entry stays stored but stops matching.
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let identity = caller.auth.require_staff()?;

    knowledge::deactivate_entry(state.db.pool(), &id).await?;
    info!(entry = %id, by = %identity.id, "Knowledge entry deactivated");

    Ok(StatusCode::NO_CONTENT)
}
