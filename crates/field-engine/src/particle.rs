use field_core::ParticleConfig;

const DENOM_FLOOR: f64 = 1e-6;
const CONSUMPTION_RATE: f64 = 0.20;

#[derive(Debug, Clone, Copy)]
pub struct ParticleState {
    /// Residual half-spread after pressure consumption, >= 0.
    pub s: f64,
    pub pressure: f64,
    pub inertia: f64,
    /// Fraction of s0 consumed, in [0, 1] for well-formed quotes.
    pub annihilation: f64,
}

/// Maps quote microstructure and standardized flow into a particle state.
/// The mapper retains `s` across ticks; the remaining outputs are pure
/// functions of the inputs.
#[derive(Debug, Clone)]
pub struct ParticleMapper {
    s: f64,
    epsilon: f64,
    shock_weight: f64,
}

impl ParticleMapper {
    pub fn new(cfg: &ParticleConfig) -> Self {
        Self {
            s: 0.0,
            epsilon: cfg.epsilon,
            shock_weight: cfg.shock_weight,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        spread: f64,
        ask: f64,
        bid: f64,
        micro_vol: f64,
        quote_size: f64,
        ofi_z: f64,
        dealer_z: f64,
        flow_impulse_z: f64,
        shock: f64,
    ) -> ParticleState {
        let s0 = if ask > 0.0 && bid > 0.0 {
            (0.5 * (ask / bid).ln()).max(0.0)
        } else {
            0.0
        };

        let denom = self.epsilon + spread + micro_vol - quote_size;
        let denom = if denom > DENOM_FLOOR { denom } else { DENOM_FLOOR };
        let inertia = 1.0 / denom;

        let pressure =
            1.0 * ofi_z + 0.7 * dealer_z + 0.5 * flow_impulse_z + self.shock_weight * shock;
        let consumption = CONSUMPTION_RATE * pressure.abs() / inertia;
        self.s = (s0 - consumption).max(0.0);

        ParticleState {
            s: self.s,
            pressure,
            inertia,
            annihilation: 1.0 - self.s / (s0 + 1e-6),
        }
    }
}
