#[cfg(test)]
mod tests {
    use crate::config::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.alpha_decay, 120);
        assert_eq!(cfg.sigma_grid.step, 0.25);
        assert_eq!(cfg.forward.mass_threshold, 0.95);
    }

    #[test]
    fn test_yaml_round_trip_with_spec_keys() {
        let yaml = r#"
alpha_decay: 60
sigma_grid:
  min: -3.0
  max: 3.0
  step: 0.5
liquidity:
  weights:
    vwap: 1.0
    bb: 0.8
particle:
  epsilon: 0.05
  shock_weight: 0.4
dealer:
  stay_prob: 0.9
  flip_prob: 0.1
hazard:
  intercepts: [-3.0, -2.5, -2.5]
  coeffs:
    A: 1.0
    P_L: 0.2
    squeeze: 0.3
    pool: 0.1
forward:
  beta_L: 0.25
  max_horizon: 20
  mass_threshold: 0.9
symbols: ["SPY", "QQQ"]
cadence_seconds: 60
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.forward.beta_l, 0.25);
        assert_eq!(cfg.alpha_decay, 60);
        assert_eq!(cfg.hazard.coeffs.a, 1.0);
        assert_eq!(cfg.hazard.coeffs.p_l, 0.2);
        assert_eq!(cfg.liquidity.weights.bb, 0.8);
        // unspecified key falls back to its default
        assert_eq!(cfg.liquidity.weights.kijun, 1.0);
        assert_eq!(cfg.symbols, vec!["SPY", "QQQ"]);
        assert_eq!(cfg.cadence_seconds, 60);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let mut cfg = AppConfig::default();
        cfg.sigma_grid.step = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.sigma_grid.min = 4.0;
        cfg.sigma_grid.max = -4.0;
        assert!(cfg.validate().is_err());

        // step must evenly divide the span
        let mut cfg = AppConfig::default();
        cfg.sigma_grid.step = 0.3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_invalid_probabilities_rejected() {
        let mut cfg = AppConfig::default();
        cfg.dealer.stay_prob = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.forward.mass_threshold = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.forward.max_horizon = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_universe_rejected() {
        let mut cfg = AppConfig::default();
        cfg.symbols.clear();
        assert!(cfg.validate().is_err());
    }
}
