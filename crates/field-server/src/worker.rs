use crate::ws_routes::FieldBroadcast;
use field_core::{AppConfig, FieldError, MarketDataProvider, SnapshotStore};
use field_engine::SymbolProcessor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Single cooperative driver for the whole symbol universe.
///
/// Each cycle walks the processors sequentially; provider calls, persistence
/// and broadcast are the only suspension points, so accumulator state is
/// never observed mid-update.
pub struct FieldWorker {
    cadence: Duration,
    provider: Arc<dyn MarketDataProvider>,
    store: Option<Arc<dyn SnapshotStore>>,
    broadcast: FieldBroadcast,
    processors: Vec<SymbolProcessor>,
    error_tx: mpsc::UnboundedSender<FieldError>,
}

impl FieldWorker {
    pub fn new(
        cfg: &AppConfig,
        provider: Arc<dyn MarketDataProvider>,
        store: Option<Arc<dyn SnapshotStore>>,
        broadcast: FieldBroadcast,
        error_tx: mpsc::UnboundedSender<FieldError>,
    ) -> Self {
        let processors = cfg
            .symbols
            .iter()
            .map(|symbol| SymbolProcessor::new(symbol.clone(), cfg))
            .collect();
        Self {
            cadence: Duration::from_secs(cfg.cadence_seconds),
            provider,
            store,
            broadcast,
            processors,
            error_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            symbols = self.processors.len(),
            cadence_secs = self.cadence.as_secs(),
            "field worker started"
        );
        let mut ticker = tokio::time::interval(self.cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    pub(crate) async fn run_cycle(&mut self) {
        for processor in &mut self.processors {
            match processor.process(self.provider.as_ref()).await {
                Ok(Some(snapshot)) => {
                    if let Some(store) = &self.store {
                        if let Err(err) = store.store(&snapshot).await {
                            // surfaced, never fatal: the snapshot still goes out
                            tracing::error!(
                                symbol = %snapshot.symbol,
                                "snapshot persistence failed: {err}"
                            );
                            let _ = self.error_tx.send(err);
                        }
                    }
                    self.broadcast.publish(snapshot);
                }
                Ok(None) => {
                    tracing::debug!(symbol = processor.symbol(), "no tick this cycle");
                }
                Err(err) => {
                    tracing::warn!(symbol = processor.symbol(), "tick skipped: {err}");
                }
            }
        }
    }
}
