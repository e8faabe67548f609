//! Core types for Brewhouse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod password;
pub mod price;
pub mod profile;
pub mod status;
pub mod validation;

pub use credential::{PasswordDigest, SessionToken};
pub use email::{Email, EmailError};
pub use id::*;
pub use password::PasswordPolicy;
pub use price::{CurrencyCode, Price};
pub use profile::{PersonName, Phone, Profile, StreetAddress, sanitize_input};
pub use status::*;
pub use validation::{Field, ValidationError};
