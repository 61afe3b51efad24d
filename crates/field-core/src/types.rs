use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed one-minute OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarTick {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl BarTick {
    /// Check the bar invariants: low <= {open, close} <= high, volume >= 0,
    /// all fields finite.
    pub fn is_valid(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Top-of-book quote (bid/ask)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub timestamp: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    pub bid_size: f64,
    pub ask_size: f64,
}

impl Quote {
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Check the quote invariants: bid <= ask, both positive and finite.
    pub fn is_valid(&self) -> bool {
        self.bid.is_finite() && self.ask.is_finite() && self.bid > 0.0 && self.bid <= self.ask
    }
}

/// Per-tick options signal: normalized absolute gamma exposure plus staleness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSummary {
    pub abs_gex_norm: f64,
    pub stale: bool,
}

/// Standardized order-flow features for one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowSummary {
    pub ofi_z: f64,
    pub flow_impulse_z: f64,
    pub sweep_rate: f64,
    pub shock: f64,
}

/// One horizon of the forward map: geometric survival mass at horizon `k`
/// plus the distribution over the z-grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonEntry {
    pub k: u32,
    pub mass: f64,
    pub dist: Vec<f64>,
}

/// Forward probability map P(tau, z), truncated at the configured mass
/// threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardCurve {
    pub entries: Vec<HorizonEntry>,
    pub cum_mass: f64,
}

/// The per-tick analytic record emitted for one symbol.
///
/// Persisted layout is stable; new fields must be additive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
    pub log_price: f64,
    pub returns: f64,
    pub sigma: f64,
    pub vwap: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub bb_width: f64,
    pub squeeze: bool,
    pub tenkan: f64,
    pub kijun: f64,
    pub cloud_state: i8,
    pub cloud_thick: f64,
    pub spread: f64,
    pub pressure: f64,
    pub inertia: f64,
    pub annihilation: f64,
    pub dealer_p: f64,
    pub dealer_q: f64,
    pub dealer_feedback: f64,
    pub lambda: f64,
    pub pool_field: Vec<f64>,
    pub forward_map: ForwardCurve,
}
