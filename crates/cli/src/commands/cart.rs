//! Cart and order commands.
//!
//! # Usage
//!
//! ```bash
//! brewhouse cart add Cappuccino 12.50 --size Grande --milk Aveia -q 2
//! brewhouse cart list
//! brewhouse cart remove 1
//! brewhouse cart checkout
//! brewhouse orders
//! ```
//!
//! Lines are numbered from 1 in listings and in `cart remove`.

use brewhouse_core::Price;
use brewhouse_storefront::models::{CartItem, Order};
use rust_decimal::Decimal;

use super::{CliError, Workspace};

/// Arguments of `brewhouse cart add`.
#[derive(Debug)]
pub struct AddArgs {
    pub name: String,
    pub price: Decimal,
    pub size: String,
    pub milk: String,
    pub quantity: Option<i64>,
}

/// Add a line to the cart.
#[allow(clippy::print_stdout)]
pub fn add(workspace: &Workspace, args: &AddArgs) -> Result<(), CliError> {
    let mut cart = workspace.cart();
    let item = cart.add_item(&args.name, &args.size, &args.milk, args.quantity, args.price)?;
    println!("Added {}.", describe(&item));
    println!("Cart total: {}", cart.total_price().display());
    Ok(())
}

/// Remove the line numbered `line` (1-based).
#[allow(clippy::print_stdout)]
pub fn remove(workspace: &Workspace, line: usize) -> Result<(), CliError> {
    let mut cart = workspace.cart();
    let index = line
        .checked_sub(1)
        .filter(|i| *i < cart.items().len())
        .ok_or_else(|| CliError::Usage(format!("No cart line {line}")))?;

    if !cart.remove_item(index) {
        return Err(CliError::Usage("Could not update the cart".to_string()));
    }
    println!("Removed line {line}. Cart total: {}", cart.total_price().display());
    Ok(())
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn list(workspace: &Workspace) {
    let cart = workspace.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for (n, item) in cart.items().iter().enumerate() {
        println!("{:>3}. {}", n + 1, describe(item));
    }
    println!(
        "{} item(s), total {}",
        cart.item_count(),
        cart.total_price().display()
    );
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(workspace: &Workspace) -> Result<(), CliError> {
    let mut cart = workspace.cart();
    if !cart.clear() {
        return Err(CliError::Usage("Could not update the cart".to_string()));
    }
    println!("Cart cleared.");
    Ok(())
}

/// Place an order for the logged-in customer.
#[allow(clippy::print_stdout)]
pub fn checkout(workspace: &Workspace) -> Result<(), CliError> {
    let guard = workspace.guard()?;
    let mut cart = workspace.cart();
    let order = cart.checkout(&guard)?;

    println!(
        "Thank you, {}! Order {} placed: {}",
        order.customer_name,
        order.id,
        Price::local(order.total).display()
    );
    Ok(())
}

/// Print the order log.
#[allow(clippy::print_stdout)]
pub fn orders(workspace: &Workspace) {
    let orders = workspace.cart().orders();
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }

    for order in &orders {
        print_order(order);
    }
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    println!(
        "{}  {}  {}  {}",
        order.placed_at.format("%Y-%m-%d %H:%M"),
        order.id,
        order.customer_name,
        Price::local(order.total).display()
    );
    for item in &order.items {
        println!("      {}", describe(item));
    }
}

fn describe(item: &CartItem) -> String {
    format!(
        "{}x {} ({}, {}) {}",
        item.quantity,
        item.name,
        item.size,
        item.milk,
        item.line_total().display()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brewhouse_core::CartItemId;

    use super::*;

    #[test]
    fn test_describe_item() {
        let item = CartItem {
            id: CartItemId::new("c1"),
            name: "Cappuccino".to_string(),
            size: "Grande".to_string(),
            milk: "Aveia".to_string(),
            quantity: 2,
            price: Decimal::new(2500, 2),
        };
        assert_eq!(describe(&item), "2x Cappuccino (Grande, Aveia) R$ 25,00");
    }
}
