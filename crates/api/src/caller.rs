//! Bearer token extraction.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chatbot::AuthContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller behind a request.
///
/// Requests without an `Authorization` header are anonymous. So are requests
/// whose token does not resolve to a live session; routes that need an
/// identity reject those with 401 themselves.
#[derive(Debug, Clone)]
pub struct Caller {
    pub auth: AuthContext,
    pub token: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self {
                auth: AuthContext::anonymous(),
                token: None,
            });
        };

        let token = value
            .to_str()
            .ok()
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            tracing::warn!("Malformed Authorization header, treating caller as anonymous");
            return Ok(Self {
                auth: AuthContext::anonymous(),
                token: None,
            });
        };

        match state.auth.resolve(token).await? {
            Some(auth) => Ok(Self {
                auth,
                token: Some(token.to_string()),
            }),
            None => {
                tracing::warn!("Unknown or expired session token, treating caller as anonymous");
                Ok(Self {
                    auth: AuthContext::anonymous(),
                    token: None,
                })
            }
        }
    }
}
