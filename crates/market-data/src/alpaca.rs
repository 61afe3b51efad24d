use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_core::{
    BarTick, FieldError, FlowSummary, MarketDataProvider, OptionsSummary, Quote,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let oldest = match ts.front() {
                Some(&front) => front,
                None => now,
            };
            let sleep_dur = self.window.saturating_sub(now.duration_since(oldest))
                + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for data API slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestBarResponse {
    bar: Option<RawBar>,
}

#[derive(Debug, Deserialize)]
struct RawBar {
    #[serde(rename = "t")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct LatestQuoteResponse {
    quote: Option<RawQuote>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(rename = "t")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "bp")]
    bid: f64,
    #[serde(rename = "ap")]
    ask: f64,
    #[serde(rename = "bs", default)]
    bid_size: f64,
    #[serde(rename = "as", default)]
    ask_size: f64,
}

/// Client for an Alpaca-style market-data REST API: latest bar and latest
/// quote per symbol, key-pair auth headers, rate limited with a bounded
/// retry on 429. This data API carries no options or flow endpoints, so
/// those capabilities report absent.
#[derive(Clone)]
pub struct AlpacaDataClient {
    base_url: String,
    key_id: String,
    secret_key: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl AlpacaDataClient {
    pub fn new(base_url: String, key_id: String, secret_key: String) -> Self {
        // 200 req/min is the free data-plan budget; override via env for
        // paid plans.
        let rate_limit: usize = std::env::var("ALPACA_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url,
            key_id,
            secret_key,
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, FieldError> {
        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let response = self
                .client
                .get(url)
                .header("APCA-API-KEY-ID", &self.key_id)
                .header("APCA-API-SECRET-KEY", &self.secret_key)
                .send()
                .await
                .map_err(|e| FieldError::Provider(e.to_string()))?;

            let status = response.status();
            if status.as_u16() == 429 {
                let wait_secs = 5u64;
                tracing::warn!(
                    "Data API rate limited, waiting {}s before retry {}/3",
                    wait_secs,
                    attempt + 1
                );
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                continue;
            }
            if status.as_u16() == 404 {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(FieldError::Provider(format!(
                    "data API returned {status} for {url}"
                )));
            }
            let body = response
                .json::<T>()
                .await
                .map_err(|e| FieldError::Provider(e.to_string()))?;
            return Ok(Some(body));
        }
        Err(FieldError::Provider(
            "rate limited by data API after 3 retries".to_string(),
        ))
    }
}

#[async_trait]
impl MarketDataProvider for AlpacaDataClient {
    async fn latest_bar(&self, symbol: &str) -> Result<Option<BarTick>, FieldError> {
        let url = format!("{}/v2/stocks/{}/bars/latest", self.base_url, symbol);
        let response: Option<LatestBarResponse> = self.get_json(&url).await?;
        Ok(response.and_then(|r| r.bar).map(|bar| BarTick {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }))
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Option<Quote>, FieldError> {
        let url = format!("{}/v2/stocks/{}/quotes/latest", self.base_url, symbol);
        let response: Option<LatestQuoteResponse> = self.get_json(&url).await?;
        Ok(response.and_then(|r| r.quote).map(|quote| Quote {
            timestamp: quote.timestamp,
            bid: quote.bid,
            ask: quote.ask,
            bid_size: quote.bid_size,
            ask_size: quote.ask_size,
        }))
    }

    async fn options_summary(&self, _symbol: &str) -> Result<Option<OptionsSummary>, FieldError> {
        Ok(None)
    }

    async fn flow_summary(&self, _symbol: &str) -> Result<Option<FlowSummary>, FieldError> {
        Ok(None)
    }
}
