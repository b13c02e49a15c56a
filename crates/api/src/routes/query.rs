//! Knowledge base query used by the chat widget.

use axum::extract::State;
use axum::Json;
use chatbot::MatchOutcome;
use serde::Deserialize;

use crate::extract::ApiJson;
use crate::state::AppState;

/// Query request body.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// Answer a free-text query. Only an unreadable body fails; misses and
/// store errors come back as `found: false` with a fixed answer.
pub async fn query(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QueryRequest>,
) -> Json<MatchOutcome> {
    Json(state.matcher.query(&request.query).await)
}
