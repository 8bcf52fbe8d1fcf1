//! Business rules sitting between the HTTP handlers and the `Repository`.
//!
//! Every function takes the repository as `&dyn Repository` and returns
//! `AppResult`, so handlers only translate HTTP in and out.

pub mod auth_content;
pub mod departments;
pub mod nav_types;
pub mod users;

use crate::error::{AppError, AppResult};

/// Rejects a blank (empty or whitespace-only) required string field.
pub(crate) fn require_text(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be blank")));
    }
    Ok(())
}
