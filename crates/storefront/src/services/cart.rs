//! Cart ledger.
//!
//! An ordered list of cart lines mirrored to the session store under
//! [`keys::CART`]. The total is recomputed from the lines on every call.

use rust_decimal::Decimal;
use thiserror::Error;

use brewhouse_core::{CartItemId, OrderId, Price, sanitize_input};

use crate::models::{CartItem, DEFAULT_OPTION, Order, keys};
use crate::services::auth::SessionProvider;
use crate::store::{SessionStore, StoreEvent};

/// Errors from cart edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The item name is empty.
    #[error("item name is required")]
    EmptyName,

    /// The unit price is negative.
    #[error("invalid price: {0}")]
    InvalidPrice(Decimal),

    /// The quantity does not fit a cart line.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The cart could not be saved; the edit was undone.
    #[error("cart could not be saved")]
    StorageUnavailable,
}

/// Errors from checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// No customer is logged in.
    #[error("login required to check out")]
    LoginRequired,

    /// The order could not be recorded; the cart is unchanged.
    #[error("order could not be saved")]
    StorageUnavailable,
}

/// The cart of one view.
#[derive(Debug)]
pub struct CartLedger {
    store: SessionStore,
    items: Vec<CartItem>,
}

impl CartLedger {
    /// Load the persisted cart, or start empty.
    #[must_use]
    pub fn load(store: SessionStore) -> Self {
        let items = store.get(keys::CART).unwrap_or_default();
        Self { store, items }
    }

    /// Re-read the cart from the store, dropping unsaved state.
    pub fn reload(&mut self) {
        self.items = self.store.get(keys::CART).unwrap_or_default();
    }

    /// React to a store change. Returns `true` if the cart was reloaded.
    pub fn apply(&mut self, event: &StoreEvent) -> bool {
        if SessionStore::logical_key(event.key()) == Some(keys::CART) {
            self.reload();
            true
        } else {
            false
        }
    }

    /// Add a line of `quantity` items at `unit_price` each.
    ///
    /// A missing or non-positive quantity means one. Empty size or milk
    /// choices become [`DEFAULT_OPTION`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyName`], [`CartError::InvalidPrice`] or
    /// [`CartError::InvalidQuantity`] for bad input, and
    /// [`CartError::StorageUnavailable`] if the cart could not be saved.
    pub fn add_item(
        &mut self,
        name: &str,
        size: &str,
        milk: &str,
        quantity: Option<i64>,
        unit_price: Decimal,
    ) -> Result<CartItem, CartError> {
        let name = sanitize_input(name);
        if name.is_empty() {
            return Err(CartError::EmptyName);
        }
        if unit_price < Decimal::ZERO {
            return Err(CartError::InvalidPrice(unit_price));
        }

        let quantity = match quantity {
            Some(q) if q > 0 => u32::try_from(q).map_err(|_| CartError::InvalidQuantity(q))?,
            _ => 1,
        };

        let price = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or(CartError::InvalidPrice(unit_price))?;

        let item = CartItem {
            id: CartItemId::generate(),
            name,
            size: option_or_default(size),
            milk: option_or_default(milk),
            quantity,
            price,
        };

        self.items.push(item.clone());
        if !self.persist() {
            self.items.pop();
            return Err(CartError::StorageUnavailable);
        }

        tracing::debug!(item = %item.name, quantity, price = %item.price, "Added cart item");
        Ok(item)
    }

    /// Remove the line at `index`. Returns whether a line was removed.
    pub fn remove_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }

        let removed = self.items.remove(index);
        if !self.persist() {
            self.items.insert(index, removed);
            return false;
        }
        true
    }

    /// Empty the cart. Returns `false` if the empty cart could not be saved.
    pub fn clear(&mut self) -> bool {
        self.items.clear();
        self.persist()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of the line prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.price).sum()
    }

    /// [`total`](Self::total) as a displayable price.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::local(self.total())
    }

    /// Turn the cart into an order for the logged-in customer.
    ///
    /// The order is appended to the order log, which never expires, and the
    /// cart is emptied.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart (whoever is
    /// logged in), [`CheckoutError::LoginRequired`] when nobody is, and
    /// [`CheckoutError::StorageUnavailable`] if the order log cannot be
    /// written.
    pub fn checkout(&mut self, session: &impl SessionProvider) -> Result<Order, CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let customer = session.current_user().ok_or(CheckoutError::LoginRequired)?;

        let order = Order {
            id: OrderId::generate(),
            items: self.items.clone(),
            total: self.total(),
            customer_name: customer.name.to_string(),
            customer_id: customer.id,
            placed_at: self.store.clock().now(),
        };

        let mut orders = self.orders();
        orders.push(order.clone());
        if !self.store.put_persistent(keys::ORDERS, &orders) {
            return Err(CheckoutError::StorageUnavailable);
        }

        if !self.clear() {
            tracing::warn!(order_id = %order.id, "Order recorded but cart could not be cleared");
        }

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            items = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    /// Every recorded order, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.store.get(keys::ORDERS).unwrap_or_default()
    }

    fn persist(&self) -> bool {
        self.store.put(keys::CART, &self.items)
    }
}

fn option_or_default(choice: &str) -> String {
    let choice = sanitize_input(choice);
    if choice.is_empty() {
        DEFAULT_OPTION.to_string()
    } else {
        choice
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Identity;
    use crate::store::MemoryStore;
    use brewhouse_core::Profile;

    struct LoggedIn(Identity);

    impl SessionProvider for LoggedIn {
        fn current_user(&self) -> Option<Identity> {
            Some(self.0.clone())
        }
    }

    struct LoggedOut;

    impl SessionProvider for LoggedOut {
        fn current_user(&self) -> Option<Identity> {
            None
        }
    }

    fn ana() -> LoggedIn {
        let profile =
            Profile::parse("Ana Silva", "ana@x.com", "(11) 91234-5678", "Rua A, 100, SP").unwrap();
        LoggedIn(Identity::from_profile(profile, Utc::now()))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ledger() -> (CartLedger, MemoryStore) {
        let backend = MemoryStore::new();
        let store = SessionStore::new(Arc::new(backend.clone()));
        (CartLedger::load(store), backend)
    }

    #[test]
    fn test_add_item_multiplies_price() {
        let (mut cart, _) = ledger();
        let item = cart
            .add_item("Cappuccino", "Grande", "Aveia", Some(3), dec("12.50"))
            .unwrap();
        assert_eq!(item.price, dec("37.50"));
        assert_eq!(item.quantity, 3);
        assert_eq!(cart.total(), dec("37.50"));
        assert_eq!(cart.total_price().display(), "R$ 37,50");
    }

    #[test]
    fn test_quantity_and_options_default() {
        let (mut cart, _) = ledger();
        let item = cart.add_item("Espresso", "", " ", Some(0), dec("6")).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.size, DEFAULT_OPTION);
        assert_eq!(item.milk, DEFAULT_OPTION);

        let item = cart.add_item("Espresso", "P", "Integral", None, dec("6")).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        let (mut cart, _) = ledger();
        assert_eq!(
            cart.add_item("Latte", "", "", None, dec("-1")),
            Err(CartError::InvalidPrice(dec("-1")))
        );
        assert_eq!(
            cart.add_item("<>", "", "", None, dec("1")),
            Err(CartError::EmptyName)
        );
        assert_eq!(
            cart.add_item("Latte", "", "", Some(i64::MAX), dec("1")),
            Err(CartError::InvalidQuantity(i64::MAX))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_free_item_allowed() {
        let (mut cart, _) = ledger();
        assert!(cart.add_item("Água", "", "", None, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_remove_item_by_index() {
        let (mut cart, _) = ledger();
        cart.add_item("Latte", "", "", None, dec("10")).unwrap();
        cart.add_item("Mocha", "", "", None, dec("12")).unwrap();

        assert!(!cart.remove_item(2));
        assert!(cart.remove_item(0));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].name, "Mocha");
        assert_eq!(cart.total(), dec("12"));
    }

    #[test]
    fn test_cart_persists_across_loads() {
        let backend = MemoryStore::new();
        let store = SessionStore::new(Arc::new(backend.clone()));
        let mut cart = CartLedger::load(store.clone());
        cart.add_item("Latte", "M", "Integral", Some(2), dec("9.90")).unwrap();

        let reloaded = CartLedger::load(store);
        assert_eq!(reloaded.items(), cart.items());
    }

    #[test]
    fn test_failed_save_undoes_edit() {
        let (mut cart, backend) = ledger();
        cart.add_item("Latte", "", "", None, dec("10")).unwrap();
        backend.set_available(false);

        assert_eq!(
            cart.add_item("Mocha", "", "", None, dec("12")),
            Err(CartError::StorageUnavailable)
        );
        assert!(!cart.remove_item(0));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_checkout_preconditions() {
        let (mut cart, _) = ledger();
        assert_eq!(cart.checkout(&LoggedOut), Err(CheckoutError::EmptyCart));
        assert_eq!(cart.checkout(&ana()), Err(CheckoutError::EmptyCart));

        cart.add_item("Latte", "", "", None, dec("10")).unwrap();
        assert_eq!(cart.checkout(&LoggedOut), Err(CheckoutError::LoginRequired));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_checkout_records_order_and_clears() {
        let (mut cart, _) = ledger();
        let customer = ana();
        cart.add_item("Latte", "", "", Some(2), dec("10")).unwrap();

        let order = cart.checkout(&customer).unwrap();
        assert_eq!(order.total, dec("20"));
        assert_eq!(order.customer_name, "Ana Silva");
        assert_eq!(order.customer_id, customer.0.id);
        assert!(cart.is_empty());
        assert_eq!(cart.orders(), vec![order]);
    }

    #[test]
    fn test_orders_outlive_the_session() {
        let backend = MemoryStore::new();
        let clock = ManualClock::starting_now();
        let store = SessionStore::with_clock(Arc::new(backend), Arc::new(clock.clone()));
        let mut cart = CartLedger::load(store.clone());
        cart.add_item("Latte", "", "", None, dec("10")).unwrap();
        let order = cart.checkout(&ana()).unwrap();

        clock.advance(TimeDelta::hours(48));
        store.sweep_expired();
        assert_eq!(CartLedger::load(store).orders(), vec![order]);
    }

    #[test]
    fn test_apply_reloads_on_cart_change() {
        let backend = MemoryStore::new();
        let store = SessionStore::new(Arc::new(backend.clone()));
        let mut view_a = CartLedger::load(store.clone());
        let mut view_b = CartLedger::load(store.clone());
        let mut events = store.subscribe();

        view_a.add_item("Latte", "", "", None, dec("10")).unwrap();
        let event = events.try_recv().unwrap();

        assert!(view_b.apply(&event));
        assert_eq!(view_b.total(), dec("10"));
        assert!(!view_b.apply(&StoreEvent::Set {
            key: "cs_current_user".into()
        }));
    }
}
