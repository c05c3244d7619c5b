//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! kb-cli cart add --id burger-1 --name "Classic" --price 75.00 --image /img/classic.png
//! kb-cli cart list
//! kb-cli cart remove-one burger-1
//! kb-cli cart delete burger-1
//! kb-cli cart total
//! kb-cli cart clear
//! ```

use clap::Subcommand;
use kingburger_checkout::{CartError, CartStore, KeyValueStore, item_count, recalc_total};
use kingburger_core::{CartItem, Product, ProductId};
use rust_decimal::Decimal;

use super::format_price;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show every line in the cart
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: ProductId,

        /// Product name
        #[arg(long)]
        name: String,

        /// Unit price, e.g. 75.00
        #[arg(long)]
        price: Decimal,

        /// Product image path or URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove one unit of a product
    RemoveOne {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product line entirely
    Delete {
        /// Product ID
        id: ProductId,
    },
    /// Empty the cart
    Clear,
    /// Show the cart total
    Total,
}

/// Run a cart subcommand.
///
/// # Errors
///
/// Returns an error if the cart cannot be written or an added price is out
/// of range.
#[allow(clippy::print_stdout)] // CLI output
pub fn run<S: KeyValueStore>(cart: &CartStore<S>, action: CartAction) -> Result<(), CartError> {
    match action {
        CartAction::List => print_cart(&cart.get_cart()),
        CartAction::Add {
            id,
            name,
            price,
            image,
        } => {
            let line = cart.add_to_cart(Product {
                id,
                name,
                unit_price: price,
                image_url: image,
            })?;
            println!("{} added to cart!", line.name);
        }
        CartAction::RemoveOne { id } => print_cart(&cart.remove_one(&id)?),
        CartAction::Delete { id } => print_cart(&cart.delete_cart_item(&id)?),
        CartAction::Clear => {
            cart.clear_cart()?;
            println!("Cart cleared.");
        }
        CartAction::Total => {
            let items = cart.get_cart();
            println!(
                "{} item(s), total {}",
                item_count(&items),
                format_price(recalc_total(&items))
            );
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)] // CLI output
fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in items {
        println!("{}", format_line(item));
    }
    println!("Total: {}", format_price(recalc_total(items)));
}

fn format_line(item: &CartItem) -> String {
    format!(
        "{:<16} {:<24} {:>3} x {:>10} = {:>10}",
        item.id,
        item.name,
        item.quantity,
        format_price(item.unit_price),
        format_price(item.line_total()),
    )
}
