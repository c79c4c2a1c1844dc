//! Handler for the `book` command.

use serde::Serialize;

use crate::adapter::inbound::cli::command::BookArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::{BookSnapshot, ProductId};
use crate::error::Result;
use crate::infrastructure::config::{Config, ExchangeKind};
use crate::infrastructure::{ExchangeFactory, TickerMode};

#[derive(Serialize)]
struct BookView<'a> {
    exchange: &'a str,
    product_id: &'a ProductId,
    #[serde(flatten)]
    book: BookSnapshot,
}

pub async fn execute(config: &Config, kind: ExchangeKind, args: &BookArgs) -> Result<()> {
    let ids = [args.product_id.clone()];
    let exchange = ExchangeFactory::create(config, kind, &ids, TickerMode::Off).await?;
    let book = exchange.get_order_book(&args.product_id)?;
    let snapshot = book.book(Some(args.depth));

    if output::is_json() {
        return output::json(&BookView {
            exchange: exchange.name(),
            product_id: book.product_id(),
            book: snapshot,
        });
    }

    output::section(format!(
        "{} {} ({}/{})",
        exchange.name(),
        book.product_id(),
        book.base_currency(),
        book.quote_currency()
    ));
    print_sides(&snapshot);
    if let (Some(bid), Some(ask)) = (snapshot.bids.first(), snapshot.asks.first()) {
        output::summary(format!("spread {}", ask.price() - bid.price()));
    }
    Ok(())
}

/// Asks from worst to best above the bids from best to worst.
fn print_sides(snapshot: &BookSnapshot) {
    for level in snapshot.asks.iter().rev() {
        output::level("ask", level);
    }
    for level in &snapshot.bids {
        output::level("bid", level);
    }
}
