/// EWMA variance estimator over log-returns.
///
/// `update` folds one squared return into the running variance and returns
/// the current sigma, floored at 1e-6 so downstream standardization never
/// divides by zero.
#[derive(Debug, Clone)]
pub struct SigmaEstimator {
    alpha: f64,
    variance: f64,
    initialized: bool,
    min_sigma: f64,
}

impl SigmaEstimator {
    pub fn new(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            variance: 0.0,
            initialized: false,
            min_sigma: 1e-6,
        }
    }

    pub fn update(&mut self, log_return: f64) -> f64 {
        let r2 = log_return * log_return;
        if !self.initialized {
            self.variance = r2;
            self.initialized = true;
        } else {
            self.variance = (1.0 - self.alpha) * self.variance + self.alpha * r2;
        }
        self.sigma()
    }

    pub fn sigma(&self) -> f64 {
        self.variance.sqrt().max(self.min_sigma)
    }
}

impl Default for SigmaEstimator {
    fn default() -> Self {
        Self::new(120)
    }
}
