//! Business logic services.
//!
//! # Services
//!
//! - `auth` - [`AuthGuard`](auth::AuthGuard): registration, rate-limited
//!   login, logout, and the credential verifiers it delegates to
//! - `audit` - security event records and sinks
//! - `cart` - [`CartLedger`](cart::CartLedger): cart lines, totals, checkout
//! - `accounts` - server-side accounts behind the auth API

pub mod accounts;
pub mod audit;
pub mod auth;
pub mod cart;
