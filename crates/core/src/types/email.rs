//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The input contains more than one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MultipleAtSymbols,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The local part contains a character outside `[A-Za-z0-9._%+-]`.
    #[error("email local part contains an invalid character")]
    InvalidLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// The domain contains a character outside `[A-Za-z0-9.-]`.
    #[error("email domain contains an invalid character")]
    InvalidDomain,
    /// The domain does not end in a top-level domain of two or more letters.
    #[error("email domain must end with a top-level domain")]
    MissingTopLevelDomain,
}

/// An email address.
///
/// Accepts the `local@domain.tld` shape used by the storefront forms.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol
/// - Local part: one or more of `A-Z a-z 0-9 . _ % + -`
/// - Domain: one or more of `A-Z a-z 0-9 . -`, ending in `.` followed by at
///   least two ASCII letters
///
/// ## Examples
///
/// ```
/// use brewhouse_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("ana@x.com").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());             // empty
/// assert!(Email::parse("no-at-symbol").is_err()); // missing @
/// assert!(Email::parse("user@localhost").is_err()); // no TLD
/// assert!(Email::parse("a@b.c").is_err());        // TLD too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Number of local-part characters kept visible by [`Email::redacted`].
    const VISIBLE_LOCAL_CHARS: usize = 3;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty or longer than 254 characters
    /// - Does not contain exactly one @ symbol
    /// - Has an empty or malformed local part or domain
    /// - Has no top-level domain of at least two letters
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MultipleAtSymbols);
        }

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        if !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
        {
            return Err(EmailError::InvalidLocalPart);
        }

        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        {
            return Err(EmailError::InvalidDomain);
        }

        let (host, tld) = domain
            .rsplit_once('.')
            .ok_or(EmailError::MissingTopLevelDomain)?;

        if host.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EmailError::MissingTopLevelDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }

    /// Case-insensitive comparison, used for account lookups.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Lower-cased form, used as a lookup key.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Returns the address with all but the first three characters of the
    /// local part hidden, e.g. `ana***@x.com`. Safe for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let visible: String = self
            .local_part()
            .chars()
            .take(Self::VISIBLE_LOCAL_CHARS)
            .collect();
        format!("{visible}***@{}", self.domain())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name@example.com").is_ok());
        assert!(Email::parse("user+tag@example.com").is_ok());
        assert!(Email::parse("user@subdomain.example.com").is_ok());
        assert!(Email::parse("user@example.co.uk").is_ok());
        assert!(Email::parse("ana@x.com").is_ok());
        assert!(Email::parse("first_last%dept@cafe-aurora.com.br").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_missing_at() {
        assert!(matches!(
            Email::parse("no-at-symbol"),
            Err(EmailError::MissingAtSymbol)
        ));
    }

    #[test]
    fn test_parse_multiple_at() {
        assert!(matches!(
            Email::parse("a@b@example.com"),
            Err(EmailError::MultipleAtSymbols)
        ));
    }

    #[test]
    fn test_parse_empty_local_part() {
        assert!(matches!(
            Email::parse("@domain.com"),
            Err(EmailError::EmptyLocalPart)
        ));
    }

    #[test]
    fn test_parse_invalid_local_part() {
        assert!(matches!(
            Email::parse("ana silva@x.com"),
            Err(EmailError::InvalidLocalPart)
        ));
        assert!(matches!(
            Email::parse("<script>@x.com"),
            Err(EmailError::InvalidLocalPart)
        ));
    }

    #[test]
    fn test_parse_empty_domain() {
        assert!(matches!(
            Email::parse("user@"),
            Err(EmailError::EmptyDomain)
        ));
    }

    #[test]
    fn test_parse_invalid_domain() {
        assert!(matches!(
            Email::parse("user@exa_mple.com"),
            Err(EmailError::InvalidDomain)
        ));
    }

    #[test]
    fn test_parse_missing_tld() {
        assert!(matches!(
            Email::parse("user@localhost"),
            Err(EmailError::MissingTopLevelDomain)
        ));
        assert!(matches!(
            Email::parse("a@b.c"),
            Err(EmailError::MissingTopLevelDomain)
        ));
        assert!(matches!(
            Email::parse("user@.com"),
            Err(EmailError::MissingTopLevelDomain)
        ));
        assert!(matches!(
            Email::parse("user@example.c0m"),
            Err(EmailError::MissingTopLevelDomain)
        ));
    }

    #[test]
    fn test_local_part_and_domain() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.local_part(), "user");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_redacted() {
        let email = Email::parse("ana.silva@x.com").unwrap();
        assert_eq!(email.redacted(), "ana***@x.com");

        let short = Email::parse("jo@x.com").unwrap();
        assert_eq!(short.redacted(), "jo***@x.com");
    }

    #[test]
    fn test_matches_ignores_case() {
        let a = Email::parse("Ana@X.com").unwrap();
        let b = Email::parse("ana@x.com").unwrap();
        assert!(a.matches(&b));
        assert_eq!(a.normalized(), "ana@x.com");
    }

    #[test]
    fn test_serde_roundtrip() {
        let email = Email::parse("user@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"user@example.com\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }

    #[test]
    fn test_from_str() {
        let email: Email = "user@example.com".parse().unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }
}
