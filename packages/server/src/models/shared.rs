use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Envelope returned by every endpoint on success.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true`.
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Creator created")]
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Page selection for list endpoints.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

impl PageParams {
    /// `(page, per_page)` clamped to accepted ranges.
    pub fn resolve(&self) -> (u64, u64) {
        (
            self.page.unwrap_or(1).max(1),
            self.per_page.unwrap_or(20).clamp(1, 100),
        )
    }
}

/// A page of items.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Collects per-field failures so a request reports all of them at once.
#[derive(Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn check(&mut self, result: Result<(), String>) {
        if let Err(msg) = result {
            self.0.push(msg);
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self.0))
        }
    }
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err("Title must be 1-256 characters".into());
    }
    Ok(())
}

/// 1-64 characters after trimming.
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err("Display name must be 1-64 characters".into());
    }
    Ok(())
}

/// 3-32 ASCII letters, digits or underscores.
pub fn validate_username(username: &str) -> Result<(), String> {
    let ok = (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok {
        return Err("Username must be 3-32 characters: letters, digits, underscore".into());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            });
    if !valid {
        return Err("Email address is invalid".into());
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), String> {
    if bio.chars().count() > 500 {
        return Err("Bio must be at most 500 characters".into());
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > 5000 {
        return Err("Description must be at most 5000 characters".into());
    }
    Ok(())
}

/// Monthly price in cents.
pub fn validate_price(price: i64) -> Result<(), String> {
    if !(0..=100_000).contains(&price) {
        return Err("Subscription price must be between 0 and 100000 cents".into());
    }
    Ok(())
}

/// Absolute http(s) URL, at most 2048 bytes.
pub fn validate_external_url(url: &str) -> Result<(), String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    let valid = url.len() <= 2048
        && !url.chars().any(|c| c.is_whitespace() || c.is_control())
        && rest.is_some_and(|r| !r.is_empty() && !r.starts_with('/'));
    if !valid {
        return Err("URL must be an absolute http(s) URL".into());
    }
    Ok(())
}

/// Parse a form value into an identifier.
pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("'{field}' must be a UUID")))
}

/// Parse an HTML-form style boolean. Absent means `false`.
pub fn parse_bool_field(value: Option<&str>, field: &str) -> Result<bool, AppError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(false),
        Some("true" | "1" | "on" | "yes") => Ok(true),
        Some("false" | "0" | "off" | "no") => Ok(false),
        Some(_) => Err(AppError::Validation(format!(
            "'{field}' must be true or false"
        ))),
    }
}

/// Result of `GET /api/health`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `ok` when every check passed, `degraded` otherwise.
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Remote store answered `SELECT 1`.
    pub database: bool,
    /// Uploads root accepts writes.
    pub storage: bool,
}
