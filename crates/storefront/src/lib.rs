//! Brewhouse storefront library.
//!
//! The client session core and the authentication API it can talk to:
//!
//! - [`store`] - expiring, namespaced key-value storage ([`store::SessionStore`])
//! - [`services::auth`] - register/login/logout with rate limiting ([`services::auth::AuthGuard`])
//! - [`services::cart`] - cart line items, totals and checkout ([`services::cart::CartLedger`])
//! - [`routes`] - the `POST /api/auth` endpoint served by `brewhouse-auth-api`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
