pub mod error;
pub mod source;

use async_trait::async_trait;

pub use error::{FetchError, FetchResult};
pub use source::ExchangeRateApiSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

/// One observation of an exchange rate. Built fresh on every fetch and
/// discarded after the notification is assembled; `rate` is always positive.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self, pair: &CurrencyPair) -> FetchResult<RateSnapshot>;
}
