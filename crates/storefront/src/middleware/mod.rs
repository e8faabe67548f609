//! HTTP middleware stack for the auth API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Rate limiting (governor)

pub mod rate_limit;

pub use rate_limit::{ClientIpKeyExtractor, auth_rate_limiter};
