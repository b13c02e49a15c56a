//! Input validation for records written by the chatbot and the back office.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Value does not match the expected format.
    InvalidFormat { field: String, reason: String },
    /// Numeric value outside the allowed range.
    OutOfRange { field: String, min: i64, max: i64, actual: i64 },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::InvalidFormat { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{} must be between {} and {} (got {})", field, min, max, actual),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for ticket titles and knowledge questions.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for knowledge base questions.
pub const MAX_QUESTION_LENGTH: usize = 500;

/// Maximum allowed length for descriptions, answers and thread messages.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Maximum allowed length for a single keyword.
pub const MAX_KEYWORD_LENGTH: usize = 64;

/// Maximum allowed length for the welcome message.
pub const MAX_WELCOME_LENGTH: usize = 1000;

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    };

    if domain.contains('@') {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain cannot start or end with a dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Validate a required free-text field: non-empty after trimming and at most `max` chars.
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a ticket priority (1 = low .. 4 = urgent).
pub fn validate_priority(priority: i64) -> Result<(), ValidationError> {
    use crate::models::{PRIORITY_LOW, PRIORITY_URGENT};

    if !(PRIORITY_LOW..=PRIORITY_URGENT).contains(&priority) {
        return Err(ValidationError::OutOfRange {
            field: "priority".to_string(),
            min: PRIORITY_LOW,
            max: PRIORITY_URGENT,
            actual: priority,
        });
    }

    Ok(())
}

/// Validate a keyword list: every keyword non-empty and reasonably short.
pub fn validate_keywords(keywords: &[String]) -> Result<(), ValidationError> {
    for keyword in keywords {
        validate_required("keyword", keyword, MAX_KEYWORD_LENGTH)?;
    }
    Ok(())
}

/// Validate an optional knowledge category. Blank is allowed.
pub fn validate_category(category: Option<&str>) -> Result<(), ValidationError> {
    let Some(category) = category else {
        return Ok(());
    };

    let len = category.trim().chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_TITLE_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a "HH:MM" time of day (24-hour clock).
pub fn validate_time_of_day(field: &str, value: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let (hours, minutes) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| invalid("expected HH:MM"))?;

    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid("expected HH:MM"));
    }

    let hours: u8 = hours.parse().map_err(|_| invalid("hours must be numeric"))?;
    let minutes: u8 = minutes
        .parse()
        .map_err(|_| invalid("minutes must be numeric"))?;

    if hours > 23 || minutes > 59 {
        return Err(invalid("time out of range"));
    }

    Ok(())
}

/// Validate weekday numbers (0 = Sunday .. 6 = Saturday).
pub fn validate_business_days(days: &[u8]) -> Result<(), ValidationError> {
    if let Some(day) = days.iter().find(|day| **day > 6) {
        return Err(ValidationError::OutOfRange {
            field: "business_days".to_string(),
            min: 0,
            max: 6,
            actual: i64::from(*day),
        });
    }
    Ok(())
}

/// Validate a WhatsApp number: optional leading `+`, then 10 to 15 digits.
pub fn validate_whatsapp_number(number: &str) -> Result<(), ValidationError> {
    let number = number.trim();
    let digits = number.strip_prefix('+').unwrap_or(number);

    if digits.is_empty() {
        return Err(ValidationError::Empty("whatsapp_number".to_string()));
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) || !(10..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "whatsapp_number".to_string(),
            reason: "expected 10 to 15 digits, optionally prefixed with +".to_string(),
        });
    }

    Ok(())
}

/// Validate a webhook URL (http or https, with a host).
pub fn validate_webhook_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "webhook_url".to_string(),
            reason: "must start with http:// or https://".to_string(),
        })?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "webhook_url".to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}
