use async_trait::async_trait;
use chrono::Utc;
use field_core::{
    BarTick, FieldError, FlowSummary, MarketDataProvider, OptionsSummary, Quote,
};
use rand::thread_rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::sync::Mutex;

const START_PRICE: f64 = 400.0;
const STEP_SIGMA: f64 = 1e-3;
const HALF_SPREAD: f64 = 0.01;

/// Demo feed: an independent geometric random walk per symbol, with
/// synthetic quotes and mildly noisy standardized flow so every pipeline
/// stage is exercised without credentials.
pub struct SimProvider {
    prices: Mutex<HashMap<String, f64>>,
    step: Normal<f64>,
    flow_noise: Normal<f64>,
}

impl SimProvider {
    pub fn new() -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
            step: Normal::new(0.0, STEP_SIGMA).expect("constant std dev is valid"),
            flow_noise: Normal::new(0.0, 0.5).expect("constant std dev is valid"),
        }
    }

    fn advance(&self, symbol: &str) -> f64 {
        let mut prices = match self.prices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let price = prices.entry(symbol.to_string()).or_insert(START_PRICE);
        *price *= self.step.sample(&mut thread_rng()).exp();
        *price
    }

    fn current(&self, symbol: &str) -> f64 {
        let prices = match self.prices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        prices.get(symbol).copied().unwrap_or(START_PRICE)
    }
}

impl Default for SimProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for SimProvider {
    async fn latest_bar(&self, symbol: &str) -> Result<Option<BarTick>, FieldError> {
        let prev = self.current(symbol);
        let price = self.advance(symbol);
        Ok(Some(BarTick {
            timestamp: Utc::now(),
            open: prev,
            high: price.max(prev) * 1.001,
            low: price.min(prev) * 0.999,
            close: price,
            volume: 1000.0,
        }))
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Option<Quote>, FieldError> {
        let price = self.current(symbol);
        Ok(Some(Quote {
            timestamp: Utc::now(),
            bid: price - HALF_SPREAD,
            ask: price + HALF_SPREAD,
            bid_size: 10.0,
            ask_size: 10.0,
        }))
    }

    async fn options_summary(&self, _symbol: &str) -> Result<Option<OptionsSummary>, FieldError> {
        Ok(Some(OptionsSummary {
            abs_gex_norm: 0.5,
            stale: false,
        }))
    }

    async fn flow_summary(&self, _symbol: &str) -> Result<Option<FlowSummary>, FieldError> {
        let mut rng = thread_rng();
        Ok(Some(FlowSummary {
            ofi_z: self.flow_noise.sample(&mut rng),
            flow_impulse_z: self.flow_noise.sample(&mut rng),
            sweep_rate: 0.0,
            shock: 0.0,
        }))
    }
}
