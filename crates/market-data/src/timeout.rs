use async_trait::async_trait;
use field_core::{
    BarTick, FieldError, FlowSummary, MarketDataProvider, OptionsSummary, Quote,
};
use std::time::Duration;

/// Wraps a provider with a per-call deadline. A call that misses the
/// deadline reports "no data this cycle" instead of stalling the driver.
pub struct TimedProvider<P> {
    inner: P,
    timeout: Duration,
}

impl<P> TimedProvider<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for TimedProvider<P> {
    async fn latest_bar(&self, symbol: &str) -> Result<Option<BarTick>, FieldError> {
        match tokio::time::timeout(self.timeout, self.inner.latest_bar(symbol)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(symbol, "latest_bar timed out after {:?}", self.timeout);
                Ok(None)
            }
        }
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Option<Quote>, FieldError> {
        match tokio::time::timeout(self.timeout, self.inner.latest_quote(symbol)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(symbol, "latest_quote timed out after {:?}", self.timeout);
                Ok(None)
            }
        }
    }

    async fn options_summary(&self, symbol: &str) -> Result<Option<OptionsSummary>, FieldError> {
        match tokio::time::timeout(self.timeout, self.inner.options_summary(symbol)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(symbol, "options_summary timed out after {:?}", self.timeout);
                Ok(None)
            }
        }
    }

    async fn flow_summary(&self, symbol: &str) -> Result<Option<FlowSummary>, FieldError> {
        match tokio::time::timeout(self.timeout, self.inner.flow_summary(symbol)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(symbol, "flow_summary timed out after {:?}", self.timeout);
                Ok(None)
            }
        }
    }
}
