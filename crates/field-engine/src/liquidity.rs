use crate::grid::ZGrid;
use crate::stats::median;
use field_core::LiquidityWeights;

const MAD_FLOOR: f64 = 1e-9;
const CLIP: f64 = 6.0;

/// Reference-level kinds contributing to the liquidity field. Each kind
/// carries its own kernel weight and bandwidth; new kinds are additive
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Vwap,
    BollingerMiddle,
    BollingerUpper,
    BollingerLower,
    Kijun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelGroup {
    Vwap,
    Bollinger,
    Ichimoku,
}

impl LevelKind {
    /// Kernel weight inside the level's group.
    pub fn weight(self) -> f64 {
        match self {
            LevelKind::Vwap => 1.0,
            LevelKind::BollingerMiddle => 1.0,
            LevelKind::BollingerUpper => 0.7,
            LevelKind::BollingerLower => 0.7,
            LevelKind::Kijun => 0.8,
        }
    }

    /// Gaussian kernel bandwidth in z units.
    pub fn bandwidth(self) -> f64 {
        match self {
            LevelKind::Vwap => 0.35,
            LevelKind::BollingerMiddle | LevelKind::BollingerUpper | LevelKind::BollingerLower => {
                0.30
            }
            LevelKind::Kijun => 0.30,
        }
    }

    fn group(self) -> LevelGroup {
        match self {
            LevelKind::Vwap => LevelGroup::Vwap,
            LevelKind::BollingerMiddle | LevelKind::BollingerUpper | LevelKind::BollingerLower => {
                LevelGroup::Bollinger
            }
            LevelKind::Kijun => LevelGroup::Ichimoku,
        }
    }
}

/// A reference price level feeding the field.
#[derive(Debug, Clone, Copy)]
pub struct LevelRef {
    pub kind: LevelKind,
    pub price: f64,
}

impl LevelRef {
    pub fn new(kind: LevelKind, price: f64) -> Self {
        Self { kind, price }
    }
}

/// Kernel-weighted liquidity density L(z) over the standardized grid,
/// robust-standardized (median/MAD) and clipped to [-6, 6].
#[derive(Debug, Clone)]
pub struct LiquidityField {
    grid: ZGrid,
    weights: LiquidityWeights,
}

impl LiquidityField {
    pub fn new(grid: ZGrid, weights: LiquidityWeights) -> Self {
        Self { grid, weights }
    }

    pub fn grid(&self) -> &ZGrid {
        &self.grid
    }

    fn group_weight(&self, group: LevelGroup) -> f64 {
        match group {
            LevelGroup::Vwap => self.weights.vwap,
            LevelGroup::Bollinger => self.weights.bb,
            LevelGroup::Ichimoku => self.weights.kijun,
        }
    }

    pub fn compute(&self, current_log_price: f64, sigma: f64, refs: &[LevelRef]) -> Vec<f64> {
        let n = self.grid.len();
        let mut total = vec![0.0; n];

        for group in [LevelGroup::Vwap, LevelGroup::Bollinger, LevelGroup::Ichimoku] {
            let outer = self.group_weight(group);
            if outer == 0.0 {
                continue;
            }
            let mut acc = vec![0.0; n];
            let mut contributed = false;
            for level in refs.iter().filter(|r| r.kind.group() == group) {
                if !(level.price > 0.0) || !level.price.is_finite() {
                    continue;
                }
                let z_c = (level.price.ln() - current_log_price) / sigma;
                let bw = level.kind.bandwidth();
                let w = level.kind.weight();
                for (slot, z) in acc.iter_mut().zip(self.grid.values()) {
                    let u = (z - z_c) / bw;
                    *slot += w * (-0.5 * u * u).exp();
                }
                contributed = true;
            }
            if contributed {
                for (slot, v) in total.iter_mut().zip(&acc) {
                    *slot += outer * v;
                }
            }
        }

        let med = median(&total);
        let deviations: Vec<f64> = total.iter().map(|v| (v - med).abs()).collect();
        let mad = median(&deviations);
        let divisor = if mad > MAD_FLOOR { mad } else { 1.0 };

        total
            .iter()
            .map(|v| ((v - med) / divisor).clamp(-CLIP, CLIP))
            .collect()
    }

    /// Field value at z = 0, i.e. liquidity clustered at the current price.
    pub fn pool_proximity(&self, field: &[f64]) -> f64 {
        field[self.grid.centre_index()]
    }
}
