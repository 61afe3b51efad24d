#[cfg(test)]
mod tests {
    use crate::worker::FieldWorker;
    use crate::ws_routes::FieldBroadcast;
    use async_trait::async_trait;
    use field_core::{AppConfig, FieldError, FieldSnapshot, SnapshotStore};
    use market_data::SimProvider;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_cycle_publishes_snapshot_per_symbol() {
        let mut cfg = AppConfig::default();
        cfg.symbols = vec!["SPY".to_string(), "QQQ".to_string()];
        let broadcast = FieldBroadcast::new();
        let mut rx = broadcast.subscribe();
        let (error_tx, _error_rx) = mpsc::unbounded_channel();

        let mut worker = FieldWorker::new(
            &cfg,
            Arc::new(SimProvider::new()),
            None,
            broadcast.clone(),
            error_tx,
        );
        worker.run_cycle().await;

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        let mut symbols = vec![first.symbol, second.symbol];
        symbols.sort();
        assert_eq!(symbols, vec!["QQQ", "SPY"]);
        assert!(broadcast.latest_for("SPY").is_some());
        assert!(broadcast.latest_for("QQQ").is_some());
    }

    /// Store that always fails, to exercise the error channel.
    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn store(&self, _snapshot: &FieldSnapshot) -> Result<(), FieldError> {
            Err(FieldError::Persistence("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_is_surfaced_but_not_fatal() {
        let cfg = AppConfig::default();
        let broadcast = FieldBroadcast::new();
        let mut rx = broadcast.subscribe();
        let (error_tx, mut error_rx) = mpsc::unbounded_channel();

        let mut worker = FieldWorker::new(
            &cfg,
            Arc::new(SimProvider::new()),
            Some(Arc::new(FailingStore)),
            broadcast,
            error_tx,
        );
        worker.run_cycle().await;

        // the error reached the channel and the snapshot was still broadcast
        assert!(matches!(
            error_rx.try_recv().unwrap(),
            FieldError::Persistence(_)
        ));
        assert!(rx.try_recv().is_ok());
    }
}
