//! Customer profile fields collected by the registration form.
//!
//! Each field is a validated newtype. [`Profile::parse`] checks the fields in
//! form order and reports the first violation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::validation::{Field, ValidationError};

/// Strip markup-significant characters and surrounding whitespace from raw
/// form input.
///
/// ```
/// use brewhouse_core::sanitize_input;
///
/// assert_eq!(sanitize_input("  <b>Ana</b> "), "bAna/b");
/// ```
#[must_use]
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// A person's display name: 2-50 letters and spaces.
///
/// Letters are judged by Unicode, so accented names such as `João Conceição`
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a name.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for [`Field::Name`] if the input is
    /// empty, outside 2-50 characters, or contains anything but letters and
    /// whitespace.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::new(Field::Name, "name is required"));
        }

        let len = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(ValidationError::new(
                Field::Name,
                format!(
                    "name must be {}-{} characters",
                    Self::MIN_LENGTH,
                    Self::MAX_LENGTH
                ),
            ));
        }

        if !s.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
            return Err(ValidationError::new(
                Field::Name,
                "name must contain only letters",
            ));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First word of the name, used for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or(&self.0)
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A phone number in a loose international or Brazilian format,
/// e.g. `(11) 91234-5678` or `+55 11912345678`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    const MIN_LENGTH: usize = 10;
    const MAX_LENGTH: usize = 15;
    const MIN_DIGITS: usize = 8;

    /// Parse a phone number.
    ///
    /// After an optional leading `+`, the number must be 10-15 characters of
    /// digits, spaces, `-`, `(` and `)`, with at least eight digits.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for [`Field::Phone`] if the format is
    /// not recognized.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::new(Field::Phone, "phone is required"));
        }

        let body = s.strip_prefix('+').unwrap_or(s);
        let len = body.chars().count();
        let allowed = body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
        let digits = body.chars().filter(char::is_ascii_digit).count();

        if !allowed || !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) || digits < Self::MIN_DIGITS {
            return Err(ValidationError::new(
                Field::Phone,
                "invalid phone format, e.g. (11) 91234-5678",
            ));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A free-form delivery address of 5-200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreetAddress(String);

impl StreetAddress {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 5;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 200;

    /// Parse an address.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for [`Field::Address`] if the trimmed
    /// input is outside 5-200 characters.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::new(Field::Address, "address is required"));
        }

        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(ValidationError::new(
                Field::Address,
                format!("address must be at least {} characters", Self::MIN_LENGTH),
            ));
        }
        if len > Self::MAX_LENGTH {
            return Err(ValidationError::new(
                Field::Address,
                format!("address must be no more than {} characters", Self::MAX_LENGTH),
            ));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated customer profile (everything but the password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: PersonName,
    pub email: Email,
    pub phone: Phone,
    pub address: StreetAddress,
}

impl Profile {
    /// Sanitize and validate raw form input, in form order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, checking name,
    /// email, phone and address in that order.
    pub fn parse(
        name: &str,
        email: &str,
        phone: &str,
        address: &str,
    ) -> Result<Self, ValidationError> {
        let name = PersonName::parse(&sanitize_input(name))?;
        let email = Email::parse(&sanitize_input(email))?;
        let phone = Phone::parse(&sanitize_input(phone))?;
        let address = StreetAddress::parse(&sanitize_input(address))?;

        Ok(Self {
            name,
            email,
            phone,
            address,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  hello  "), "hello");
        assert_eq!(sanitize_input("<script>"), "script");
    }

    #[test]
    fn test_name_accepts_accents() {
        let name = PersonName::parse("João Conceição").unwrap();
        assert_eq!(name.first_name(), "João");
        assert!(PersonName::parse("Ana Silva").is_ok());
        assert!(PersonName::parse("Zoë").is_ok());
    }

    #[test]
    fn test_name_rejects_invalid() {
        assert_eq!(PersonName::parse("").unwrap_err().message, "name is required");
        assert!(PersonName::parse("A").is_err());
        assert!(PersonName::parse(&"a".repeat(51)).is_err());
        assert!(PersonName::parse("Ana 2").is_err());
        assert!(PersonName::parse("O'Brien").is_err());
    }

    #[test]
    fn test_phone_formats() {
        assert!(Phone::parse("(11) 91234-5678").is_ok());
        assert!(Phone::parse("+5511912345678").is_ok());
        assert!(Phone::parse("11 1234-5678").is_ok());
    }

    #[test]
    fn test_phone_rejects_invalid() {
        assert!(Phone::parse("").is_err());
        assert!(Phone::parse("12345").is_err());
        assert!(Phone::parse("(11) 9123a-5678").is_err());
        assert!(Phone::parse("((((((((((((").is_err());
        assert!(Phone::parse("+55 (11) 91234-5678").is_err());
    }

    #[test]
    fn test_address_bounds() {
        assert!(StreetAddress::parse("Rua A, 100, SP").is_ok());
        assert!(StreetAddress::parse("Rua A").is_ok());
        assert!(StreetAddress::parse("Rua").is_err());
        assert!(StreetAddress::parse(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_profile_reports_first_violation() {
        let err = Profile::parse("A", "bad", "1", "x").unwrap_err();
        assert_eq!(err.field, Field::Name);

        let err = Profile::parse("Ana Silva", "bad", "1", "x").unwrap_err();
        assert_eq!(err.field, Field::Email);

        let err = Profile::parse("Ana Silva", "ana@x.com", "1", "x").unwrap_err();
        assert_eq!(err.field, Field::Phone);

        let err = Profile::parse("Ana Silva", "ana@x.com", "(11) 91234-5678", "x").unwrap_err();
        assert_eq!(err.field, Field::Address);
    }

    #[test]
    fn test_profile_sanitizes() {
        let profile = Profile::parse(
            " Ana Silva ",
            " ana@x.com ",
            "(11) 91234-5678",
            "Rua <A>, 100, SP",
        )
        .unwrap();
        assert_eq!(profile.name.as_str(), "Ana Silva");
        assert_eq!(profile.email.as_str(), "ana@x.com");
        assert_eq!(profile.address.as_str(), "Rua A, 100, SP");
    }
}
