//! Chatbot / WhatsApp settings. A single row, created by the migrations.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{ChatbotSettings, SettingsUpdate};

/// Load the current settings.
pub async fn get_settings(pool: &SqlitePool) -> Result<ChatbotSettings> {
    sqlx::query_as::<_, ChatbotSettings>(
        r#"
        SELECT whatsapp_enabled, whatsapp_number, webhook_url, welcome_message,
               business_hours_start, business_hours_end, business_days,
               updated_by, updated_at
        FROM chatbot_settings
        WHERE id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "ChatbotSettings",
        id: "1".to_string(),
    })
}

/// Replace the settings. The caller validates the values.
pub async fn update_settings(
    pool: &SqlitePool,
    update: &SettingsUpdate,
    updated_by: Option<&str>,
) -> Result<ChatbotSettings> {
    let mut days = update.business_days.clone();
    days.sort_unstable();
    days.dedup();

    let blank_to_none = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    sqlx::query(
        r#"
        INSERT INTO chatbot_settings (
            id, whatsapp_enabled, whatsapp_number, webhook_url, welcome_message,
            business_hours_start, business_hours_end, business_days, updated_by
        )
        VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            whatsapp_enabled = excluded.whatsapp_enabled,
            whatsapp_number = excluded.whatsapp_number,
            webhook_url = excluded.webhook_url,
            welcome_message = excluded.welcome_message,
            business_hours_start = excluded.business_hours_start,
            business_hours_end = excluded.business_hours_end,
            business_days = excluded.business_days,
            updated_by = excluded.updated_by,
            updated_at = datetime('now')
        "#,
    )
    .bind(update.whatsapp_enabled)
    .bind(blank_to_none(&update.whatsapp_number))
    .bind(blank_to_none(&update.webhook_url))
    .bind(update.welcome_message.trim())
    .bind(update.business_hours_start.trim())
    .bind(update.business_hours_end.trim())
    .bind(Json(&days))
    .bind(updated_by)
    .execute(pool)
    .await?;

    get_settings(pool).await
}
