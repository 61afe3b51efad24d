#[cfg(test)]
mod tests {
    use crate::SymbolProcessor;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use field_core::{
        AppConfig, BarTick, FieldError, FlowSummary, MarketDataProvider, OptionsSummary, Quote,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap()
    }

    fn bar_at(minute: i64, close: f64, volume: f64) -> BarTick {
        BarTick {
            timestamp: t0() + Duration::minutes(minute),
            open: close,
            high: close + 0.01,
            low: close - 0.01,
            close,
            volume,
        }
    }

    /// Scripted provider: pops one bar per tick, serves static quote / flow /
    /// options payloads.
    struct MockProvider {
        bars: Mutex<VecDeque<BarTick>>,
        quote: Option<Quote>,
        flow: Option<FlowSummary>,
        options: Option<OptionsSummary>,
    }

    impl MockProvider {
        fn with_bars(bars: Vec<BarTick>) -> Self {
            Self {
                bars: Mutex::new(bars.into()),
                quote: None,
                flow: None,
                options: None,
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn latest_bar(&self, _symbol: &str) -> Result<Option<BarTick>, FieldError> {
            Ok(self.bars.lock().unwrap().pop_front())
        }

        async fn latest_quote(&self, _symbol: &str) -> Result<Option<Quote>, FieldError> {
            Ok(self.quote.clone())
        }

        async fn options_summary(
            &self,
            _symbol: &str,
        ) -> Result<Option<OptionsSummary>, FieldError> {
            Ok(self.options.clone())
        }

        async fn flow_summary(&self, _symbol: &str) -> Result<Option<FlowSummary>, FieldError> {
            Ok(self.flow.clone())
        }
    }

    #[tokio::test]
    async fn test_no_bar_emits_nothing() {
        let provider = MockProvider::with_bars(vec![]);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());
        let result = processor.process(&provider).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_flat_market_snapshot() {
        let bars: Vec<BarTick> = (0..50).map(|i| bar_at(i, 100.0, 1000.0)).collect();
        let provider = MockProvider::with_bars(bars);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        let mut last = None;
        for _ in 0..50 {
            last = processor.process(&provider).await.unwrap();
            assert!(last.is_some());
        }
        let snap = last.unwrap();

        assert!((snap.sigma - 1e-6).abs() < 1e-12);
        assert_eq!(snap.bb_width, 0.0);
        assert!(!snap.squeeze);
        assert_eq!(snap.rsi, 0.0);
        assert_eq!(snap.pool_field.len(), 33);
        assert!(snap.pool_field.iter().all(|v| v.is_finite()));

        // masses form a truncated geometric series in (1 - lambda)
        let entries = &snap.forward_map.entries;
        assert!(!entries.is_empty());
        if entries.len() >= 2 {
            let ratio = entries[1].mass / entries[0].mass;
            assert!((ratio - (1.0 - snap.lambda)).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_snapshot_serializes_without_nan() {
        let bars: Vec<BarTick> = (0..30).map(|i| bar_at(i, 100.0 + i as f64, 1000.0)).collect();
        let provider = MockProvider::with_bars(bars);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        for _ in 0..30 {
            let snap = processor.process(&provider).await.unwrap().unwrap();
            let json = serde_json::to_string(&snap).unwrap();
            assert!(!json.contains("NaN"));
            assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
        }
    }

    #[tokio::test]
    async fn test_timestamps_non_decreasing_and_stale_bars_dropped() {
        let mut bars: Vec<BarTick> = (0..5).map(|i| bar_at(i, 100.0, 1000.0)).collect();
        // a bar from before the last emitted one
        bars.push(bar_at(1, 99.0, 1000.0));
        bars.push(bar_at(6, 101.0, 1000.0));
        let provider = MockProvider::with_bars(bars);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        let mut timestamps = Vec::new();
        for _ in 0..7 {
            if let Some(snap) = processor.process(&provider).await.unwrap() {
                timestamps.push(snap.timestamp);
            }
        }
        // the stale bar was dropped, everything else came through in order
        assert_eq!(timestamps.len(), 6);
        for pair in timestamps.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[tokio::test]
    async fn test_missing_quote_uses_default_spread() {
        let provider = MockProvider::with_bars(vec![bar_at(0, 100.0, 1000.0)]);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());
        let snap = processor.process(&provider).await.unwrap().unwrap();
        assert!((snap.spread - 0.01).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_malformed_bar_skipped_without_state_change() {
        let mut bad = bar_at(0, 100.0, 1000.0);
        bad.low = 150.0; // violates low <= close
        let provider = MockProvider::with_bars(vec![bad, bar_at(1, 100.0, 1000.0)]);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        assert!(processor.process(&provider).await.unwrap().is_none());
        let snap = processor.process(&provider).await.unwrap().unwrap();
        // the valid bar is treated as the first tick: zero log-return
        assert_eq!(snap.returns, 0.0);
    }

    #[tokio::test]
    async fn test_monotonic_rally() {
        let bars: Vec<BarTick> = (0..30)
            .map(|i| bar_at(i, 100.0 + i as f64 * 0.5, 1000.0))
            .collect();
        let mut provider = MockProvider::with_bars(bars);
        provider.quote = Some(Quote {
            timestamp: t0(),
            bid: 99.99,
            ask: 100.01,
            bid_size: 10.0,
            ask_size: 10.0,
        });
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        let mut snap = None;
        for _ in 0..30 {
            snap = processor.process(&provider).await.unwrap();
        }
        let snap = snap.unwrap();
        assert!((snap.rsi - 1.0).abs() < 1e-9);
        assert!(snap.annihilation >= 0.0);
        assert!(snap.lambda > 0.0 && snap.lambda < 1.0);
    }

    #[tokio::test]
    async fn test_flow_and_options_drive_dealer() {
        let bars: Vec<BarTick> = (0..20).map(|i| bar_at(i, 100.0, 1000.0)).collect();
        let mut provider = MockProvider::with_bars(bars);
        provider.flow = Some(FlowSummary {
            ofi_z: 1.0,
            flow_impulse_z: 1.0,
            sweep_rate: 1.0,
            shock: 0.0,
        });
        provider.options = Some(OptionsSummary {
            abs_gex_norm: 1.0,
            stale: false,
        });
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        let mut snap = None;
        for _ in 0..20 {
            snap = processor.process(&provider).await.unwrap();
        }
        let snap = snap.unwrap();
        // persistent positive evidence pushes p toward 0, feedback negative
        assert!(snap.dealer_p < 0.1);
        assert!(snap.dealer_feedback < 0.0);
        assert!(snap.dealer_q > 0.9);
    }

    #[tokio::test]
    async fn test_dealer_reports_neutral_when_evidence_disappears() {
        // ten ticks with flow + options: the filter drifts well away from 1/2
        let bars: Vec<BarTick> = (0..10).map(|i| bar_at(i, 100.0, 1000.0)).collect();
        let mut with_data = MockProvider::with_bars(bars);
        with_data.flow = Some(FlowSummary {
            ofi_z: 1.0,
            flow_impulse_z: 1.0,
            sweep_rate: 1.0,
            shock: 0.0,
        });
        with_data.options = Some(OptionsSummary {
            abs_gex_norm: 1.0,
            stale: false,
        });

        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());
        let mut snap = None;
        for _ in 0..10 {
            snap = processor.process(&with_data).await.unwrap();
        }
        let drifted = snap.unwrap();
        assert!(drifted.dealer_p < 0.1);

        // next tick has neither flow nor options: the snapshot must carry
        // the literal neutral values, not the drifted posterior
        let without_data = MockProvider::with_bars(vec![bar_at(10, 100.0, 1000.0)]);
        let neutral = processor.process(&without_data).await.unwrap().unwrap();
        assert_eq!(neutral.dealer_p, 0.5);
        assert_eq!(neutral.dealer_q, 0.5);
        assert_eq!(neutral.dealer_feedback, 0.0);

        // when evidence returns, the filter resumes from its posterior: one
        // update from a reset filter could only reach ~0.047
        let mut resumed_data = MockProvider::with_bars(vec![bar_at(11, 100.0, 1000.0)]);
        resumed_data.flow = with_data.flow.clone();
        resumed_data.options = with_data.options.clone();
        let resumed = processor.process(&resumed_data).await.unwrap().unwrap();
        assert!(resumed.dealer_p < 0.01);
    }

    #[tokio::test]
    async fn test_without_flow_dealer_stays_neutral() {
        let bars: Vec<BarTick> = (0..10).map(|i| bar_at(i, 100.0, 1000.0)).collect();
        let provider = MockProvider::with_bars(bars);
        let mut processor = SymbolProcessor::new("SPY", &AppConfig::default());

        let mut snap = None;
        for _ in 0..10 {
            snap = processor.process(&provider).await.unwrap();
        }
        let snap = snap.unwrap();
        assert_eq!(snap.dealer_p, 0.5);
        assert_eq!(snap.dealer_q, 0.5);
        assert_eq!(snap.dealer_feedback, 0.0);
    }
}
