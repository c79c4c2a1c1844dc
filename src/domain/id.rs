//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::UsageError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a string.")]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[doc = concat!("Get the ", stringify!($name), " as a string slice.")]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Exchange-specific product identifier (`BTC-USD` on Coinbase, `BTCUSDT` on Binance).
    ProductId
);

string_id!(
    /// Exchange-specific account identifier.
    AccountId
);

string_id!(
    /// Order identifier assigned by the exchange.
    OrderId
);

impl ProductId {
    /// Validate user input: non-empty, ASCII letters, digits and `-` only.
    ///
    /// Exchange-specific composition is not checked here.
    pub fn parse(input: &str) -> Result<Self, UsageError> {
        let trimmed = input.trim();
        let invalid = |reason: &str| UsageError::InvalidProductId {
            product_id: input.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(invalid(&format!("unexpected character '{c}'")));
        }
        Ok(Self::new(trimmed))
    }
}

/// Handle returned when a ticker callback is registered.
///
/// Generated as UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(uuid::Uuid);

impl CallbackId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
