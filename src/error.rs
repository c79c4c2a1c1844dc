use thiserror::Error;

/// A requested product, book, account or currency does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown product: {product_id}")]
    UnknownProduct { product_id: String },

    #[error("no order book tracked for product {product_id}")]
    UnknownOrderBook { product_id: String },

    #[error("no account held in currency {currency}")]
    UnknownCurrency { currency: String },

    #[error("product {product_id} is missing its {field}")]
    UnresolvedProduct {
        product_id: String,
        field: &'static str,
    },
}

/// Invalid combination of arguments. Raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("specify either a currency or an account id, not both")]
    ConflictingAccountSelectors,

    #[error("an account lookup needs a currency or an account id")]
    MissingAccountSelector,

    #[error("invalid product id '{product_id}': {reason}")]
    InvalidProductId { product_id: String, reason: String },

    #[error("no products given on the command line or in the configuration")]
    NoProducts,

    #[error("{exchange} does not support {operation}")]
    Unsupported {
        exchange: String,
        operation: &'static str,
    },
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure reported by a wrapped exchange client.
    #[error("{exchange} client error: {message}")]
    Exchange {
        exchange: &'static str,
        message: String,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    #[error("malformed {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("order book factory built {built} books for {requested} products")]
    FactoryMismatch { requested: usize, built: usize },

    #[error("ticker feed closed")]
    FeedClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl Error {
    /// True for lookup failures (unknown product, book, account or currency).
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }

    /// True for argument misuse detected before any client call.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Run `fut` with a deadline, mapping expiry to [`Error::Timeout`].
pub(crate) async fn with_timeout<T, F>(operation: &'static str, after_ms: u64, fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(std::time::Duration::from_millis(after_ms), fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation,
            after_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_render_their_subject() {
        let err: Error = LookupError::UnknownProduct {
            product_id: "DOGE-XYZ".into(),
        }
        .into();
        assert!(err.is_lookup());
        assert_eq!(err.to_string(), "unknown product: DOGE-XYZ");
    }

    #[test]
    fn usage_errors_are_classified() {
        let err: Error = UsageError::ConflictingAccountSelectors.into();
        assert!(err.is_usage());
        assert!(!err.is_lookup());
    }

    #[tokio::test]
    async fn with_timeout_reports_operation() {
        let result: Result<()> = with_timeout("initial product fetch", 5, async {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::Timeout {
                operation: "initial product fetch",
                after_ms: 5
            })
        ));
    }
}
