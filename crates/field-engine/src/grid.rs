use field_core::SigmaGridConfig;

/// Fixed standardized log-price grid, z in [min, max] at `step` spacing.
#[derive(Debug, Clone)]
pub struct ZGrid {
    values: Vec<f64>,
}

impl ZGrid {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let n = ((max - min) / step).round() as usize + 1;
        let values = (0..n).map(|i| min + i as f64 * step).collect();
        Self { values }
    }

    pub fn from_config(cfg: &SigmaGridConfig) -> Self {
        Self::new(cfg.min, cfg.max, cfg.step)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of z = 0 on the default symmetric grid.
    pub fn centre_index(&self) -> usize {
        (self.values.len() - 1) / 2
    }
}

impl Default for ZGrid {
    fn default() -> Self {
        Self::new(-4.0, 4.0, 0.25)
    }
}
