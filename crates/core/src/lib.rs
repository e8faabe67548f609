//! Brewhouse Core - Shared domain types.
//!
//! This crate provides the types shared by every Brewhouse component:
//! - `storefront` - Client session core (session store, auth guard, cart) and
//!   the remote authentication API
//! - `cli` - Command-line driver for the client core
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows both the client and
//! the server to apply exactly the same input rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, profile fields,
//!   password policy and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
