//! Cart and order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brewhouse_core::{CartItemId, OrderId, Price, UserId};

/// Size or milk choice used when none is given.
pub const DEFAULT_OPTION: &str = "Padrão";

/// One cart line. `price` is the line total (unit price times quantity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub name: String,
    pub size: String,
    pub milk: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl CartItem {
    /// Line total as a displayable price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::local(self.price)
    }
}

/// A checked-out cart, appended to the order log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub customer_name: String,
    pub customer_id: UserId,
    pub placed_at: DateTime<Utc>,
}
