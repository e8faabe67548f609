//! Password digests and comparison.
//!
//! The offline verifier stores `sha256(password + salt)` as lowercase hex.
//! The auth API stores Argon2id PHC strings instead.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use brewhouse_core::PasswordDigest;

use super::AuthError;

/// Digest of `password` concatenated with the application salt.
#[must_use]
pub fn salted_digest(password: &str, salt: &str) -> PasswordDigest {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    PasswordDigest::new(hex::encode(hasher.finalize()))
}

/// Compare two byte strings in time independent of where they first differ.
///
/// Length differences still return early; digests compared here always
/// have the same length.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// An Argon2id hash no password matches, with the default parameters.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Y72wxlrnqmZfcgtRrIGzwg$+ffFTuuYOcCk9h8mlXccxZuKCfE3R5dTTeT0XEGRwi4";

/// Spend the same Argon2 work as [`verify_password`] without an account,
/// so a login for an unknown email takes as long as a wrong password.
pub fn verify_dummy_password(password: &str) {
    let _ = verify_password(password, DUMMY_HASH);
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns [`AuthError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against an Argon2 PHC string.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] on mismatch or a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
