//! Display-name normalization shared by folder and file operations.

use docvault_core::error::AppError;
use docvault_core::result::AppResult;

/// Trim `raw` and enforce `1..=max_chars` characters.
pub fn normalize_name(field: &str, raw: &str, max_chars: usize) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_field(field, "must not be empty"));
    }
    if name.chars().count() > max_chars {
        return Err(AppError::invalid_field(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    if name.chars().any(|c| c == '/' || c.is_control()) {
        return Err(AppError::invalid_field(
            field,
            "must not contain '/' or control characters",
        ));
    }
    Ok(name.to_string())
}
