use field_core::DealerConfig;

const STALE_ATTENUATION: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct DealerState {
    /// Probability dealers are net long exposure.
    pub p: f64,
    /// Confidence, saturating as p moves away from 1/2.
    pub q: f64,
    /// Signed GEX feedback, attenuated when the options data is stale.
    pub feedback: f64,
}

impl DealerState {
    /// The state reported on a tick with no flow/options evidence:
    /// p = q = 1/2, zero feedback, regardless of where the filter has
    /// drifted.
    pub fn neutral() -> Self {
        Self {
            p: 0.5,
            q: 0.5,
            feedback: 0.0,
        }
    }
}

/// Two-state Bayesian filter over the dealer side, updated in logit space.
#[derive(Debug, Clone)]
pub struct DealerFilter {
    p: f64,
    q: f64,
    stay_prob: f64,
    flip_prob: f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl DealerFilter {
    pub fn new(cfg: &DealerConfig) -> Self {
        Self {
            p: 0.5,
            q: 0.5,
            stay_prob: cfg.stay_prob,
            flip_prob: cfg.flip_prob,
        }
    }

    /// Signed side bias 2p - 1 of the current (pre-update) state.
    pub fn side_bias(&self) -> f64 {
        2.0 * self.p - 1.0
    }

    pub fn update(&mut self, z_features: &[f64], abs_gex_norm: f64, is_stale: bool) -> DealerState {
        let evidence: f64 = z_features.iter().sum();
        let p_prior = self.p * self.stay_prob + (1.0 - self.p) * self.flip_prob;

        let logit_post = (p_prior / (1.0 - p_prior + 1e-9)).ln() - evidence;
        self.p = sigmoid(logit_post);
        self.q = sigmoid(1.0 + 2.0 * (2.0 * self.p - 1.0).abs());

        let mut feedback = (2.0 * self.p - 1.0) * abs_gex_norm * self.q;
        if is_stale {
            feedback *= STALE_ATTENUATION;
        }

        DealerState {
            p: self.p,
            q: self.q,
            feedback,
        }
    }
}
