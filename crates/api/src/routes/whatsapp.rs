//! WhatsApp contact and business hours settings.

use axum::extract::State;
use axum::Json;
use database::validation::{
    validate_business_days, validate_required, validate_time_of_day, validate_webhook_url,
    validate_whatsapp_number, MAX_WELCOME_LENGTH,
};
use database::{settings, ChatbotSettings, SettingsUpdate, ValidationError};
use serde::Serialize;
use tracing::info;

use crate::caller::Caller;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

/// The part of the settings the chat widget needs.
#[derive(Debug, Serialize)]
pub struct PublicSettings {
    pub whatsapp_enabled: bool,
    pub whatsapp_number: Option<String>,
    pub welcome_message: String,
    pub business_hours_start: String,
    pub business_hours_end: String,
    pub business_days: Vec<u8>,
}

impl From<ChatbotSettings> for PublicSettings {
    fn from(settings: ChatbotSettings) -> Self {
        Self {
            whatsapp_enabled: settings.whatsapp_enabled,
            whatsapp_number: settings.whatsapp_number,
            welcome_message: settings.welcome_message,
            business_hours_start: settings.business_hours_start,
            business_hours_end: settings.business_hours_end,
            business_days: settings.business_days,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SettingsView {
    Full(ChatbotSettings),
    Public(PublicSettings),
}

/// Staff get the full record; everyone else only the widget fields.
pub async fn get(State(state): State<AppState>, caller: Caller) -> Result<Json<SettingsView>> {
    let settings = settings::get_settings(state.db.pool()).await?;
    let view = if caller.auth.is_staff() {
        SettingsView::Full(settings)
    } else {
        SettingsView::Public(settings.into())
    };
    Ok(Json(view))
}

/// Replace the settings. Admin only.
pub async fn replace(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(update): ApiJson<SettingsUpdate>,
) -> Result<Json<ChatbotSettings>> {
    let identity = caller.auth.require_admin()?;
    validate_settings(&update)?;

    let settings = settings::update_settings(state.db.pool(), &update, Some(&identity.id)).await?;
    info!(
        by = %identity.id,
        whatsapp_enabled = settings.whatsapp_enabled,
        "Chatbot settings updated"
    );

    Ok(Json(settings))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate_settings(update: &SettingsUpdate) -> std::result::Result<(), ValidationError> {
    validate_required("welcome_message", &update.welcome_message, MAX_WELCOME_LENGTH)?;
    validate_time_of_day("business_hours_start", &update.business_hours_start)?;
    validate_time_of_day("business_hours_end", &update.business_hours_end)?;

    // Both are zero-padded HH:MM, so string order is time order.
    if update.business_hours_start.trim() >= update.business_hours_end.trim() {
        return Err(ValidationError::InvalidFormat {
            field: "business_hours_end".to_string(),
            reason: "must be after business_hours_start".to_string(),
        });
    }

    validate_business_days(&update.business_days)?;

    match non_blank(&update.whatsapp_number) {
        Some(number) => validate_whatsapp_number(number)?,
        None if update.whatsapp_enabled => {
            return Err(ValidationError::Empty("whatsapp_number".to_string()));
        }
        None => {}
    }

    if let Some(url) = non_blank(&update.webhook_url) {
        validate_webhook_url(url)?;
    }

    Ok(())
}
