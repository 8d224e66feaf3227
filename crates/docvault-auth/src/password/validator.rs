//! Password policy enforcement.

use docvault_core::config::auth::AuthConfig;
use docvault_core::error::AppError;

/// Checks passwords against the configured length bounds.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    max_length: usize,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
        }
    }

    /// Length is counted in characters, not bytes.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let len = password.chars().count();
        if len < self.min_length || len > self.max_length {
            return Err(AppError::invalid_field(
                "password",
                format!(
                    "must be between {} and {} characters",
                    self.min_length, self.max_length
                ),
            ));
        }
        if password.trim().is_empty() {
            return Err(AppError::invalid_field("password", "must not be blank"));
        }
        Ok(())
    }
}
