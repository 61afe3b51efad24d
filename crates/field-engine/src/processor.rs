use crate::{
    DealerFilter, DealerState, ForwardMapper, HazardModel, IchimokuAccumulator, LevelKind,
    LevelRef, LiquidityField, ParticleMapper, SigmaEstimator, TechnicalsAccumulator, ZGrid,
};
use chrono::{DateTime, Utc};
use field_core::{AppConfig, FieldError, FieldSnapshot, MarketDataProvider, Quote};

/// Spread assumed when no usable quote is available this tick.
const DEFAULT_SPREAD: f64 = 0.01;

/// One symbol's streaming pipeline: owns every accumulator and turns one
/// bar (plus optional quote/options/flow data) into one snapshot.
///
/// Processing is strictly sequential within a tick; no stage reads state
/// mutated by a later stage.
pub struct SymbolProcessor {
    symbol: String,
    sigma: SigmaEstimator,
    technicals: TechnicalsAccumulator,
    ichimoku: IchimokuAccumulator,
    liquidity: LiquidityField,
    particle: ParticleMapper,
    dealer: DealerFilter,
    hazard: HazardModel,
    forward: ForwardMapper,
    last_log_price: Option<f64>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl SymbolProcessor {
    pub fn new(symbol: impl Into<String>, cfg: &AppConfig) -> Self {
        let grid = ZGrid::from_config(&cfg.sigma_grid);
        Self {
            symbol: symbol.into(),
            sigma: SigmaEstimator::new(cfg.alpha_decay),
            technicals: TechnicalsAccumulator::new(),
            ichimoku: IchimokuAccumulator::new(),
            liquidity: LiquidityField::new(grid.clone(), cfg.liquidity.weights),
            particle: ParticleMapper::new(&cfg.particle),
            dealer: DealerFilter::new(&cfg.dealer),
            hazard: HazardModel::new(cfg.hazard),
            forward: ForwardMapper::new(grid, &cfg.forward),
            last_log_price: None,
            last_timestamp: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Run one tick. Returns `Ok(None)` when there is no (usable) bar this
    /// cycle; in that case no accumulator state has been touched.
    pub async fn process(
        &mut self,
        provider: &dyn MarketDataProvider,
    ) -> Result<Option<FieldSnapshot>, FieldError> {
        let bar = match provider.latest_bar(&self.symbol).await? {
            Some(bar) => bar,
            None => return Ok(None),
        };
        if !bar.is_valid() {
            tracing::warn!(symbol = %self.symbol, "discarding malformed bar");
            return Ok(None);
        }
        if let Some(last) = self.last_timestamp {
            if bar.timestamp < last {
                tracing::warn!(symbol = %self.symbol, "discarding out-of-order bar");
                return Ok(None);
            }
        }

        let log_price = bar.close.ln();
        let log_return = match self.last_log_price {
            Some(last) => log_price - last,
            None => 0.0,
        };
        self.last_log_price = Some(log_price);

        let sigma = self.sigma.update(log_return);
        let tech = self.technicals.update(bar.close, bar.volume);
        let ichi = self.ichimoku.update(bar.high, bar.low, bar.close);

        let refs = [
            LevelRef::new(LevelKind::Vwap, tech.vwap),
            LevelRef::new(LevelKind::BollingerMiddle, tech.bb.middle),
            LevelRef::new(LevelKind::BollingerUpper, tech.bb.upper),
            LevelRef::new(LevelKind::BollingerLower, tech.bb.lower),
        ];
        let pool_field = self.liquidity.compute(log_price, sigma, &refs);
        let pool_proximity = self.liquidity.pool_proximity(&pool_field);

        let quote = match provider.latest_quote(&self.symbol).await {
            Ok(Some(q)) if q.is_valid() => Some(q),
            Ok(Some(_)) => {
                tracing::debug!(symbol = %self.symbol, "discarding malformed quote");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(symbol = %self.symbol, "quote fetch failed: {e}");
                None
            }
        };
        let quote = quote.unwrap_or_else(|| Quote {
            timestamp: bar.timestamp,
            bid: bar.close - DEFAULT_SPREAD / 2.0,
            ask: bar.close + DEFAULT_SPREAD / 2.0,
            bid_size: 0.0,
            ask_size: 0.0,
        });
        let spread = quote.spread();

        let flow = match provider.flow_summary(&self.symbol).await {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(symbol = %self.symbol, "flow fetch failed: {e}");
                None
            }
        };
        let options = match provider.options_summary(&self.symbol).await {
            Ok(o) => o,
            Err(e) => {
                tracing::debug!(symbol = %self.symbol, "options fetch failed: {e}");
                None
            }
        };

        // The particle sees the dealer's pre-update side bias, never state
        // mutated later this tick.
        let dealer_bias = self.dealer.side_bias();
        let (ofi_z, flow_impulse_z, sweep_rate, shock) = match &flow {
            Some(f) => (f.ofi_z, f.flow_impulse_z, f.sweep_rate, f.shock),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        let part = self.particle.update(
            spread,
            quote.ask,
            quote.bid,
            0.0,
            0.0,
            ofi_z,
            dealer_bias,
            flow_impulse_z,
            shock,
        );

        let lambda = self.hazard.compute(
            ichi.state,
            part.annihilation,
            0.0,
            tech.bb.squeeze,
            pool_proximity,
            0.0,
            0.0,
        );
        let forward_map = self.forward.compute(lambda, bar.close, sigma, &pool_field);

        // A tick without flow/options evidence reports the literal neutral
        // state; the filter itself keeps its posterior for the next
        // evidence tick.
        let dealer_state = if flow.is_some() || options.is_some() {
            let z_features = [ofi_z, flow_impulse_z, sweep_rate];
            let (abs_gex_norm, stale) = match &options {
                Some(o) => (o.abs_gex_norm, o.stale),
                None => (0.0, true),
            };
            self.dealer.update(&z_features, abs_gex_norm, stale)
        } else {
            DealerState::neutral()
        };

        self.last_timestamp = Some(bar.timestamp);

        Ok(Some(FieldSnapshot {
            timestamp: bar.timestamp,
            symbol: self.symbol.clone(),
            price: bar.close,
            log_price,
            returns: log_return,
            sigma,
            vwap: tech.vwap,
            rsi: tech.rsi,
            bb_upper: tech.bb.upper,
            bb_middle: tech.bb.middle,
            bb_lower: tech.bb.lower,
            bb_width: tech.bb.width,
            squeeze: tech.bb.squeeze,
            tenkan: ichi.tenkan,
            kijun: ichi.kijun,
            cloud_state: ichi.state,
            cloud_thick: ichi.thick,
            spread,
            pressure: part.pressure,
            inertia: part.inertia,
            annihilation: part.annihilation,
            dealer_p: dealer_state.p,
            dealer_q: dealer_state.q,
            dealer_feedback: dealer_state.feedback,
            lambda,
            pool_field,
            forward_map,
        }))
    }
}
