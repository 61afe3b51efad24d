#[cfg(test)]
mod tests {
    use crate::{SimProvider, TimedProvider};
    use async_trait::async_trait;
    use field_core::{
        BarTick, FieldError, FlowSummary, MarketDataProvider, OptionsSummary, Quote,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_sim_bars_are_valid_and_walk() {
        let provider = SimProvider::new();
        let first = provider.latest_bar("SPY").await.unwrap().unwrap();
        assert!(first.is_valid());

        let mut moved = false;
        for _ in 0..20 {
            let bar = provider.latest_bar("SPY").await.unwrap().unwrap();
            assert!(bar.is_valid());
            if (bar.close - first.close).abs() > f64::EPSILON {
                moved = true;
            }
        }
        assert!(moved);
    }

    #[tokio::test]
    async fn test_sim_symbols_walk_independently() {
        let provider = SimProvider::new();
        for _ in 0..10 {
            provider.latest_bar("SPY").await.unwrap();
        }
        let spy = provider.latest_quote("SPY").await.unwrap().unwrap();
        let qqq = provider.latest_quote("QQQ").await.unwrap().unwrap();
        assert!(spy.is_valid());
        assert!(qqq.is_valid());
        // QQQ has not ticked yet: still at its starting level
        assert!(((qqq.bid + qqq.ask) / 2.0 - 400.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sim_quote_brackets_price() {
        let provider = SimProvider::new();
        provider.latest_bar("SPY").await.unwrap();
        let quote = provider.latest_quote("SPY").await.unwrap().unwrap();
        assert!(quote.is_valid());
        assert!((quote.spread() - 0.02).abs() < 1e-12);
    }

    /// Provider that never completes.
    struct StuckProvider;

    #[async_trait]
    impl MarketDataProvider for StuckProvider {
        async fn latest_bar(&self, _symbol: &str) -> Result<Option<BarTick>, FieldError> {
            std::future::pending().await
        }

        async fn latest_quote(&self, _symbol: &str) -> Result<Option<Quote>, FieldError> {
            std::future::pending().await
        }

        async fn options_summary(
            &self,
            _symbol: &str,
        ) -> Result<Option<OptionsSummary>, FieldError> {
            std::future::pending().await
        }

        async fn flow_summary(&self, _symbol: &str) -> Result<Option<FlowSummary>, FieldError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_timed_provider_converts_timeout_to_absent() {
        let provider = TimedProvider::new(StuckProvider, Duration::from_millis(10));
        let bar = provider.latest_bar("SPY").await.unwrap();
        assert!(bar.is_none());
        let quote = provider.latest_quote("SPY").await.unwrap();
        assert!(quote.is_none());
    }

    #[tokio::test]
    async fn test_timed_provider_passes_data_through() {
        let provider = TimedProvider::new(SimProvider::new(), Duration::from_secs(1));
        let bar = provider.latest_bar("SPY").await.unwrap();
        assert!(bar.is_some());
    }
}
