use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::rate::error::{FetchError, FetchResult};
use crate::rate::{CurrencyPair, RateSnapshot, RateSource};

const DISPLAY_DECIMALS: i32 = 4;

/// Rate table as published by the remote source: every value is the amount
/// of that currency one unit of the quote currency buys.
#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

pub struct ExchangeRateApiSource {
    client: Client,
    endpoint: String,
}

impl ExchangeRateApiSource {
    pub fn new(endpoint: &str) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateApiSource {
    async fn fetch_rate(&self, pair: &CurrencyPair) -> FetchResult<RateSnapshot> {
        let url = format!("{}/latest/{}", self.endpoint, pair.quote);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body: LatestRates = response.json().await?;
        snapshot_from_rates(pair, &body.rates, chrono::Utc::now())
    }
}

/// The source denominates rates in the quote currency, so the entry for the
/// base currency is inverted before display.
pub(crate) fn snapshot_from_rates(
    pair: &CurrencyPair,
    rates: &HashMap<String, f64>,
    observed_at: chrono::DateTime<chrono::Utc>,
) -> FetchResult<RateSnapshot> {
    let quoted = rates
        .get(&pair.base)
        .copied()
        .ok_or_else(|| FetchError::MissingRate(pair.base.clone()))?;
    if !quoted.is_finite() || quoted <= 0.0 {
        return Err(FetchError::InvalidRate {
            code: pair.base.clone(),
            rate: quoted,
        });
    }
    Ok(RateSnapshot {
        base: pair.base.clone(),
        quote: pair.quote.clone(),
        rate: round_half_up(1.0 / quoted, DISPLAY_DECIMALS),
        observed_at,
    })
}

fn round_half_up(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
