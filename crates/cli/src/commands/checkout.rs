//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! kb-cli checkout --payment-type eft \
//!     --street "1 Main Road" --city Durban --postal-code 4001 --country "South Africa"
//! ```

use clap::Args;
use kingburger_checkout::{Checkout, CheckoutFailure, CheckoutRequest, KeyValueStore};
use kingburger_core::{DeliveryAddress, PaymentType};

use super::format_price;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Payment method (`card` or `eft`)
    #[arg(long, default_value = "card")]
    payment_type: PaymentType,

    /// Street address
    #[arg(long)]
    street: Option<String>,

    /// Suburb
    #[arg(long)]
    suburb: Option<String>,

    /// City
    #[arg(long)]
    city: Option<String>,

    /// Postal code
    #[arg(long)]
    postal_code: Option<String>,

    /// Country
    #[arg(long)]
    country: Option<String>,

    /// Label for the address, e.g. "Home"
    #[arg(long)]
    address_name: Option<String>,
}

impl CheckoutArgs {
    /// Delivery address from the flags, if any address flag was given.
    ///
    /// Missing required parts are left blank so validation reports them.
    fn delivery_address(&self) -> Option<DeliveryAddress> {
        let given = [&self.street, &self.city, &self.postal_code, &self.country]
            .iter()
            .any(|field| field.is_some());
        if !given {
            return None;
        }

        Some(DeliveryAddress {
            address_name: self.address_name.clone(),
            street: self.street.clone().unwrap_or_default(),
            suburb: self.suburb.clone(),
            city: self.city.clone().unwrap_or_default(),
            postal_code: self.postal_code.clone().unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
        })
    }
}

/// Run one checkout attempt and print the payment URL.
///
/// # Errors
///
/// Returns the [`CheckoutFailure`] after printing its shopper-facing message.
#[allow(clippy::print_stdout)] // CLI output
pub async fn run<S: KeyValueStore + Clone>(
    checkout: &Checkout<S>,
    args: CheckoutArgs,
) -> Result<(), CheckoutFailure> {
    let request = CheckoutRequest {
        payment_type: args.payment_type,
        delivery_address: args.delivery_address(),
    };

    match checkout.checkout(request).await {
        Ok(receipt) => {
            println!("Order {} placed.", receipt.merchant_reference);
            println!("Amount due: {}", format_price(receipt.amount));
            println!("Complete your payment at:");
            println!("{}", receipt.redirect_url);
            Ok(())
        }
        Err(failure) => {
            println!("{}", failure.user_message());
            if failure.cart_preserved {
                println!("Your cart has been kept.");
            }
            Err(failure)
        }
    }
}
