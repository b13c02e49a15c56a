//! Sign-in endpoints for back-office accounts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chatbot::{AuthError, Identity};
use serde::{Deserialize, Serialize};

use crate::caller::Caller;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub identity: Identity,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (token, identity) = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse { token, identity }))
}

pub async fn logout(State(state): State<AppState>, caller: Caller) -> Result<StatusCode> {
    let token = caller.token.ok_or(AuthError::Unauthenticated)?;
    state.auth.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The identity behind the bearer token.
pub async fn current(caller: Caller) -> Result<Json<Identity>> {
    let identity = caller.auth.require_identity()?;
    Ok(Json(identity.clone()))
}
