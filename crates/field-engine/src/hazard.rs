use field_core::HazardConfig;

/// Logistic regime-change hazard with regime-indexed intercepts.
#[derive(Debug, Clone)]
pub struct HazardModel {
    cfg: HazardConfig,
}

impl HazardModel {
    pub fn new(cfg: HazardConfig) -> Self {
        Self { cfg }
    }

    /// Instantaneous hazard in (0, 1). `d_vwap` and `d_kijun` are accepted
    /// for interface stability but do not enter the current model.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        cloud_state: i8,
        annihilation: f64,
        pressure_inertia_ratio: f64,
        squeeze: bool,
        pool_proximity: f64,
        _d_vwap: f64,
        _d_kijun: f64,
    ) -> f64 {
        let regime_idx = match cloud_state {
            1 => 1,
            -1 => 2,
            _ => 0,
        };
        let c = &self.cfg.coeffs;
        let logit = self.cfg.intercepts[regime_idx]
            + c.a * annihilation
            + c.p_l * pressure_inertia_ratio
            + c.squeeze * if squeeze { 1.0 } else { 0.0 }
            + c.pool * pool_proximity;
        1.0 / (1.0 + (-logit).exp())
    }
}
