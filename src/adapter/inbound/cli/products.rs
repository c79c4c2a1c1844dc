//! Handler for the `products` command.

use crate::adapter::inbound::cli::command::ProductsArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::Product;
use crate::error::Result;
use crate::infrastructure::config::{Config, ExchangeKind};
use crate::infrastructure::{ExchangeFactory, TickerMode};

pub async fn execute(config: &Config, kind: ExchangeKind, args: &ProductsArgs) -> Result<()> {
    let exchange = ExchangeFactory::create(config, kind, &[], TickerMode::Off).await?;
    let products = filter(
        exchange.get_all_products().await?,
        args.base.as_deref(),
        args.quote.as_deref(),
    );

    if output::is_json() {
        return output::json(&products);
    }
    for product in &products {
        output::product_row(product);
    }
    output::summary(format!("{} products on {}", products.len(), exchange.name()));
    Ok(())
}

/// Keep products whose currencies equal every filter given, sorted by id.
fn filter(products: Vec<Product>, base: Option<&str>, quote: Option<&str>) -> Vec<Product> {
    let wanted = |field: &Option<String>, filter: Option<&str>| {
        filter.map_or(true, |f| field.as_deref().is_some_and(|v| v.eq_ignore_ascii_case(f)))
    };
    let mut kept: Vec<_> = products
        .into_iter()
        .filter(|p| wanted(&p.base_currency, base) && wanted(&p.quote_currency, quote))
        .collect();
    kept.sort_by(|a, b| a.product_id.cmp(&b.product_id));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::sample_products;

    fn ids(products: &[Product]) -> Vec<String> {
        products
            .iter()
            .filter_map(|p| p.product_id.as_ref().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn filters_combine() {
        let kept = filter(sample_products(), Some("btc"), Some("USD"));
        assert_eq!(ids(&kept), ["BTC-USD"]);
    }

    #[test]
    fn no_filters_sorts_everything() {
        let kept = filter(sample_products(), None, None);
        assert_eq!(ids(&kept), ["BTC-EUR", "BTC-USD", "ETH-BTC", "ETH-USD"]);
    }

    #[test]
    fn quote_only() {
        let kept = filter(sample_products(), None, Some("BTC"));
        assert_eq!(ids(&kept), ["ETH-BTC"]);
    }
}
