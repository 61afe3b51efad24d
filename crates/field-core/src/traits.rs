use crate::{BarTick, FieldError, FieldSnapshot, FlowSummary, OptionsSummary, Quote};
use async_trait::async_trait;

/// Market data capability set consumed by the pipeline.
///
/// Every call may return `Ok(None)` (no data this cycle) or a transient
/// error; both are tolerated by the scheduler.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn latest_bar(&self, symbol: &str) -> Result<Option<BarTick>, FieldError>;
    async fn latest_quote(&self, symbol: &str) -> Result<Option<Quote>, FieldError>;
    async fn options_summary(&self, symbol: &str) -> Result<Option<OptionsSummary>, FieldError>;
    async fn flow_summary(&self, symbol: &str) -> Result<Option<FlowSummary>, FieldError>;
}

/// Snapshot persistence sink. `store` must be idempotent on
/// `(symbol, timestamp)`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn store(&self, snapshot: &FieldSnapshot) -> Result<(), FieldError>;
}
