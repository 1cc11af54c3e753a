//! Downloads USD-based currency rates.
//!
//! Two mirrors of the same public dataset are tried in order. Fetches are
//! throttled process-wide so repeated refresh requests do not hammer them.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use crate::rates;
use crate::units::currency::CurrencyRateSet;

pub const PRIMARY_RATES_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/usd.min.json";
pub const FALLBACK_RATES_URL: &str =
    "https://latest.currency-api.pages.dev/v1/currencies/usd.min.json";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const MIN_FETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rates were fetched recently; retry in {0}s")]
    RateLimited(u64),
    #[error("every rate source failed: {0}")]
    AllSourcesFailed(String),
    #[error("rate source returned an invalid payload")]
    InvalidPayload,
}

pub struct RateFetcher {
    client: Client,
    sources: Vec<String>,
    min_interval: Duration,
}

impl RateFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_sources(
            vec![PRIMARY_RATES_URL.to_string(), FALLBACK_RATES_URL.to_string()],
            MIN_FETCH_INTERVAL,
        )
    }

    pub fn with_sources(sources: Vec<String>, min_interval: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("numby/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            sources,
            min_interval,
        })
    }

    /// Fetches a complete rate set from the first source that answers with
    /// a valid payload.
    pub fn fetch(&self) -> Result<CurrencyRateSet, FetchError> {
        rates::begin_fetch(self.min_interval)
            .map_err(|wait| FetchError::RateLimited(wait.as_secs().max(1)))?;

        let mut failures = Vec::with_capacity(self.sources.len());
        for url in &self.sources {
            match self.fetch_from(url) {
                Ok(set) => {
                    info!("fetched {} rates dated {} from {}", set.len(), set.date(), url);
                    return Ok(set);
                }
                Err(e) => {
                    warn!("rate source {} failed: {}", url, e);
                    failures.push(format!("{}: {}", url, e));
                }
            }
        }
        Err(FetchError::AllSourcesFailed(failures.join("; ")))
    }

    fn fetch_from(&self, url: &str) -> Result<CurrencyRateSet, FetchError> {
        let response = self.client.get(url).send()?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text()?;
                CurrencyRateSet::from_json(&body).map_err(|_| FetchError::InvalidPayload)
            }
            status => Err(FetchError::AllSourcesFailed(format!("status {}", status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_sources_are_all_reported() {
        let fetcher = RateFetcher::with_sources(
            vec![
                "http://127.0.0.1:9/first.json".to_string(),
                "http://127.0.0.1:9/second.json".to_string(),
            ],
            Duration::ZERO,
        )
        .unwrap();
        match fetcher.fetch() {
            Err(FetchError::AllSourcesFailed(message)) => {
                assert!(message.contains("first.json"));
                assert!(message.contains("second.json"));
            }
            other => panic!("unexpected outcome: {:?}", other.map(|s| s.len())),
        }
    }
}
