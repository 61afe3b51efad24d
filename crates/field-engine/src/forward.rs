use crate::grid::ZGrid;
use field_core::{ForwardConfig, ForwardCurve, HorizonEntry};
use std::f64::consts::PI;

/// Forward probability map: geometric survival weights across integer
/// horizons, each carrying a liquidity-tilted Gaussian over the z-grid.
///
/// The map is memoryless across calls: survival restarts at 1 on every
/// `compute`. The per-horizon shape is constant in k; only the masses decay.
#[derive(Debug, Clone)]
pub struct ForwardMapper {
    grid: ZGrid,
    beta_l: f64,
    max_horizon: u32,
    mass_threshold: f64,
}

impl ForwardMapper {
    pub fn new(grid: ZGrid, cfg: &ForwardConfig) -> Self {
        Self {
            grid,
            beta_l: cfg.beta_l,
            max_horizon: cfg.max_horizon,
            mass_threshold: cfg.mass_threshold,
        }
    }

    /// `price` and `sigma` are accepted for interface stability; the current
    /// model shapes the distribution from the liquidity field alone.
    pub fn compute(&self, lambda: f64, _price: f64, _sigma: f64, field: &[f64]) -> ForwardCurve {
        let norm = 1.0 / (2.0 * PI).sqrt();
        let mut shape: Vec<f64> = self
            .grid
            .values()
            .iter()
            .zip(field)
            .map(|(z, l)| norm * (-0.5 * z * z).exp() * (self.beta_l * l).exp())
            .collect();
        let total: f64 = shape.iter().sum();
        if total > 0.0 {
            for v in &mut shape {
                *v /= total;
            }
        }

        let mut entries = Vec::new();
        let mut survival = 1.0;
        let mut cum_mass = 0.0;
        for k in 1..=self.max_horizon {
            let mass = lambda * survival;
            survival *= 1.0 - lambda;
            cum_mass += mass;
            entries.push(HorizonEntry {
                k,
                mass,
                dist: shape.clone(),
            });
            if cum_mass >= self.mass_threshold {
                break;
            }
        }

        ForwardCurve { entries, cum_mass }
    }
}
