//! Tradable products and fuzzy product patterns.
//!
//! A [`Product`] doubles as a lookup result (all fields populated) and as a
//! filter pattern (any subset populated). Filters use [`Product::partial_match`],
//! which succeeds when any field set on both sides agrees.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A trading pair on an exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    /// Exchange-specific identifier.
    pub product_id: Option<ProductId>,
    /// The asset being priced.
    pub base_currency: Option<String>,
    /// The pricing unit.
    pub quote_currency: Option<String>,
}

impl Product {
    /// A fully-resolved product with every field populated.
    pub fn resolved(
        product_id: impl Into<ProductId>,
        base_currency: impl Into<String>,
        quote_currency: impl Into<String>,
    ) -> Self {
        Self {
            product_id: Some(product_id.into()),
            base_currency: Some(base_currency.into()),
            quote_currency: Some(quote_currency.into()),
        }
    }

    /// Pattern matching a single product id.
    pub fn with_id(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: Some(product_id.into()),
            ..Self::default()
        }
    }

    /// Pattern matching every product with this base currency.
    pub fn with_base(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: Some(base_currency.into()),
            ..Self::default()
        }
    }

    /// Pattern matching every product with this quote currency.
    pub fn with_quote(quote_currency: impl Into<String>) -> Self {
        Self {
            quote_currency: Some(quote_currency.into()),
            ..Self::default()
        }
    }

    /// True if any field is non-empty on both sides and equal.
    #[must_use]
    pub fn partial_match(&self, other: &Product) -> bool {
        fn agree(a: Option<&str>, b: Option<&str>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => !a.is_empty() && a == b,
                _ => false,
            }
        }

        agree(
            self.product_id.as_ref().map(ProductId::as_str),
            other.product_id.as_ref().map(ProductId::as_str),
        ) || agree(self.base_currency.as_deref(), other.base_currency.as_deref())
            || agree(
                self.quote_currency.as_deref(),
                other.quote_currency.as_deref(),
            )
    }

    /// True when no field carries a value. An empty pattern matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        fn blank(field: Option<&str>) -> bool {
            field.map_or(true, str::is_empty)
        }

        blank(self.product_id.as_ref().map(ProductId::as_str))
            && blank(self.base_currency.as_deref())
            && blank(self.quote_currency.as_deref())
    }

    /// True when all three fields are populated.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.product_id.is_some() && self.base_currency.is_some() && self.quote_currency.is_some()
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {} base: {} quote: {}",
            self.product_id.as_ref().map_or("-", ProductId::as_str),
            self.base_currency.as_deref().unwrap_or("-"),
            self.quote_currency.as_deref().unwrap_or("-"),
        )
    }
}
