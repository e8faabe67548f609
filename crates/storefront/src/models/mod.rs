//! Domain models for the client core and the auth API.
//!
//! - [`user`] - the customer identity and the locally stored account
//! - [`session`] - the current-session record and the store keys
//! - [`cart`] - cart lines and placed orders
//! - [`api`] - request/response bodies of `POST /api/auth`

pub mod api;
pub mod cart;
pub mod session;
pub mod user;

pub use api::{AuthRequest, AuthResponse, LoginRequest, RegisterRequest};
pub use cart::{CartItem, DEFAULT_OPTION, Order};
pub use session::{CurrentSession, keys};
pub use user::{Identity, StoredAccount};
