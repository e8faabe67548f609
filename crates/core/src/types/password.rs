//! Password strength policy.

use super::validation::{Field, ValidationError};

/// Strength rules applied to new passwords.
///
/// The default policy requires at least eight characters including an
/// uppercase letter, a lowercase letter, a digit and an ASCII punctuation
/// symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum number of characters.
    pub min_length: usize,
    /// Whether an ASCII punctuation symbol is required.
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: Self::MIN_LENGTH,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    /// Default minimum password length.
    pub const MIN_LENGTH: usize = 8;

    /// Check a candidate password against the policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for [`Field::Password`] describing the
    /// first rule the password violates.
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::new(Field::Password, "password is required"));
        }

        if password.chars().count() < self.min_length {
            return Err(ValidationError::new(
                Field::Password,
                format!("password must be at least {} characters", self.min_length),
            ));
        }

        let has_upper = password.chars().any(char::is_uppercase);
        let has_lower = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !(has_upper && has_lower && has_digit) {
            return Err(ValidationError::new(
                Field::Password,
                "password must contain uppercase, lowercase and a number",
            ));
        }

        if self.require_symbol && !password.chars().any(|c| c.is_ascii_punctuation()) {
            return Err(ValidationError::new(
                Field::Password,
                "password must contain a special character",
            ));
        }

        Ok(())
    }
}
