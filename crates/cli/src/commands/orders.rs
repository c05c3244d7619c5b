//! Order history command.
//!
//! # Usage
//!
//! ```bash
//! kb-cli orders --status paid --from 2025-01-01 --to 2025-01-31 --page 2 --page-size 20
//! ```

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use kingburger_checkout::{
    Checkout, CheckoutError, KeyValueStore, OrderHistoryPage, OrderHistoryQuery, OrderSummary,
};
use kingburger_core::PaymentType;

use super::format_price;

#[derive(Args)]
pub struct OrdersArgs {
    /// Only orders with this status (e.g. `pending`, `paid`)
    #[arg(long)]
    status: Option<String>,

    /// Only orders paid with this method (`card` or `eft`)
    #[arg(long)]
    payment_type: Option<PaymentType>,

    /// Only the order with this merchant reference
    #[arg(long)]
    reference: Option<String>,

    /// Orders placed on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Orders placed on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Orders per page (1-100)
    #[arg(long, default_value_t = 10)]
    page_size: u32,
}

impl From<OrdersArgs> for OrderHistoryQuery {
    fn from(args: OrdersArgs) -> Self {
        Self {
            status: args.status,
            payment_type: args.payment_type,
            merchant_reference: args.reference,
            date_from: args.from.map(|d| d.and_time(NaiveTime::MIN)),
            date_to: args.to.map(end_of_day),
            page: args.page,
            page_size: args.page_size,
        }
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + chrono::Duration::days(1) - chrono::Duration::seconds(1)
}

/// Fetch and print one page of order history.
///
/// # Errors
///
/// Returns an error if no token is stored or the request fails.
pub async fn run<S: KeyValueStore + Clone>(
    checkout: &Checkout<S>,
    args: OrdersArgs,
) -> Result<(), CheckoutError> {
    let page = checkout.order_history(&args.into()).await?;
    print_page(&page);
    Ok(())
}

#[allow(clippy::print_stdout)] // CLI output
fn print_page(page: &OrderHistoryPage) {
    if page.orders.is_empty() {
        println!("No orders found.");
        return;
    }

    for order in &page.orders {
        println!("{}", format_order(order));
        for line in &order.items {
            println!(
                "    {} x {} @ {}",
                line.quantity,
                line.name,
                format_price(line.unit_price)
            );
        }
    }
    println!(
        "Page {} of {} ({} orders)",
        page.page, page.total_pages, page.total_records
    );
}

fn format_order(order: &OrderSummary) -> String {
    format!(
        "{}  {}  {:<8} {:<5} {}",
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.merchant_reference,
        order.status,
        order.payment_type,
        format_price(order.total),
    )
}
