//! Runtime configuration: YAML-backed with env overrides, validated once at
//! startup and shared read-only afterwards.

use crate::FieldError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// z-grid bounds for the liquidity field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SigmaGridConfig {
    #[serde(default = "default_z_min")]
    pub min: f64,
    #[serde(default = "default_z_max")]
    pub max: f64,
    #[serde(default = "default_z_step")]
    pub step: f64,
}

fn default_z_min() -> f64 {
    -4.0
}

fn default_z_max() -> f64 {
    4.0
}

fn default_z_step() -> f64 {
    0.25
}

impl Default for SigmaGridConfig {
    fn default() -> Self {
        Self {
            min: default_z_min(),
            max: default_z_max(),
            step: default_z_step(),
        }
    }
}

/// Outer weights applied to each reference-level group of the liquidity
/// field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LiquidityWeights {
    #[serde(default = "default_group_weight")]
    pub vwap: f64,
    #[serde(default = "default_group_weight")]
    pub bb: f64,
    #[serde(default = "default_group_weight")]
    pub kijun: f64,
}

fn default_group_weight() -> f64 {
    1.0
}

impl Default for LiquidityWeights {
    fn default() -> Self {
        Self {
            vwap: 1.0,
            bb: 1.0,
            kijun: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LiquidityConfig {
    #[serde(default)]
    pub weights: LiquidityWeights,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "default_particle_epsilon")]
    pub epsilon: f64,
    /// Linear coefficient on the `shock` flow input in the pressure sum.
    #[serde(default = "default_shock_weight")]
    pub shock_weight: f64,
}

fn default_particle_epsilon() -> f64 {
    0.05
}

fn default_shock_weight() -> f64 {
    0.5
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            epsilon: default_particle_epsilon(),
            shock_weight: default_shock_weight(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DealerConfig {
    #[serde(default = "default_stay_prob")]
    pub stay_prob: f64,
    #[serde(default = "default_flip_prob")]
    pub flip_prob: f64,
}

fn default_stay_prob() -> f64 {
    0.95
}

fn default_flip_prob() -> f64 {
    0.05
}

impl Default for DealerConfig {
    fn default() -> Self {
        Self {
            stay_prob: default_stay_prob(),
            flip_prob: default_flip_prob(),
        }
    }
}

/// Hazard logit coefficients. Field names mirror the config keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HazardCoeffs {
    #[serde(rename = "A", default = "default_coeff_a")]
    pub a: f64,
    #[serde(rename = "P_L", default = "default_coeff_p_l")]
    pub p_l: f64,
    #[serde(default = "default_coeff_squeeze")]
    pub squeeze: f64,
    #[serde(default = "default_coeff_pool")]
    pub pool: f64,
}

fn default_coeff_a() -> f64 {
    0.8
}

fn default_coeff_p_l() -> f64 {
    0.15
}

fn default_coeff_squeeze() -> f64 {
    0.5
}

fn default_coeff_pool() -> f64 {
    0.25
}

impl Default for HazardCoeffs {
    fn default() -> Self {
        Self {
            a: default_coeff_a(),
            p_l: default_coeff_p_l(),
            squeeze: default_coeff_squeeze(),
            pool: default_coeff_pool(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HazardConfig {
    /// Intercepts indexed by regime: [neutral, bullish, bearish].
    #[serde(default = "default_hazard_intercepts")]
    pub intercepts: [f64; 3],
    #[serde(default)]
    pub coeffs: HazardCoeffs,
}

fn default_hazard_intercepts() -> [f64; 3] {
    [-3.0, -2.6, -2.6]
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            intercepts: default_hazard_intercepts(),
            coeffs: HazardCoeffs::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForwardConfig {
    #[serde(rename = "beta_L", default = "default_beta_l")]
    pub beta_l: f64,
    #[serde(default = "default_max_horizon")]
    pub max_horizon: u32,
    #[serde(default = "default_mass_threshold")]
    pub mass_threshold: f64,
}

fn default_beta_l() -> f64 {
    0.35
}

fn default_max_horizon() -> u32 {
    30
}

fn default_mass_threshold() -> f64 {
    0.95
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            beta_l: default_beta_l(),
            max_horizon: default_max_horizon(),
            mass_threshold: default_mass_threshold(),
        }
    }
}

/// Which data provider backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Simulated random-walk feed, no credentials needed.
    #[default]
    Sim,
    /// Alpaca-style REST market-data API.
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub mode: ProviderMode,
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Per-call timeout; an elapsed call means "no data this cycle".
    #[serde(default = "default_provider_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_provider_base_url() -> String {
    "https://data.alpaca.markets".to_string()
}

fn default_provider_timeout_seconds() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::default(),
            base_url: default_provider_base_url(),
            timeout_seconds: default_provider_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// EWMA span for the sigma estimator.
    #[serde(default = "default_alpha_decay")]
    pub alpha_decay: usize,
    #[serde(default)]
    pub sigma_grid: SigmaGridConfig,
    #[serde(default)]
    pub liquidity: LiquidityConfig,
    #[serde(default)]
    pub particle: ParticleConfig,
    #[serde(default)]
    pub dealer: DealerConfig,
    #[serde(default)]
    pub hazard: HazardConfig,
    #[serde(default)]
    pub forward: ForwardConfig,
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Tick cadence in seconds (5 for demo, 60 in production).
    #[serde(default = "default_cadence_seconds")]
    pub cadence_seconds: u64,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_alpha_decay() -> usize {
    120
}

fn default_symbols() -> Vec<String> {
    vec!["SPY".to_string()]
}

fn default_cadence_seconds() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            alpha_decay: default_alpha_decay(),
            sigma_grid: SigmaGridConfig::default(),
            liquidity: LiquidityConfig::default(),
            particle: ParticleConfig::default(),
            dealer: DealerConfig::default(),
            hazard: HazardConfig::default(),
            forward: ForwardConfig::default(),
            symbols: default_symbols(),
            cadence_seconds: default_cadence_seconds(),
            provider: ProviderConfig::default(),
            database_url: None,
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: YAML file named by `FIELD_CONFIG` (default
    /// `config/default.yaml`), falling back to built-in defaults when the
    /// file does not exist. `DATABASE_URL` and `BIND_ADDR` env vars override
    /// their file counterparts. Validation failures are fatal.
    pub fn load() -> Result<Self, FieldError> {
        let path =
            std::env::var("FIELD_CONFIG").unwrap_or_else(|_| "config/default.yaml".to_string());
        let mut cfg = if Path::new(&path).exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| FieldError::Config(format!("cannot read {path}: {e}")))?;
            serde_yaml::from_str(&raw)
                .map_err(|e| FieldError::Config(format!("cannot parse {path}: {e}")))?
        } else {
            tracing::warn!("config file {path} not found, using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                cfg.database_url = Some(url);
            }
        }
        if let Ok(bind) = std::env::var("BIND_ADDR") {
            if !bind.is_empty() {
                cfg.server.bind = bind;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the pipeline cannot run on.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.alpha_decay == 0 {
            return Err(FieldError::Config("alpha_decay must be >= 1".into()));
        }
        let grid = &self.sigma_grid;
        if !(grid.step > 0.0) || !(grid.min < grid.max) {
            return Err(FieldError::Config(
                "sigma_grid requires min < max and step > 0".into(),
            ));
        }
        let span_steps = (grid.max - grid.min) / grid.step;
        if (span_steps - span_steps.round()).abs() > 1e-9 {
            return Err(FieldError::Config(
                "sigma_grid step must evenly divide max - min".into(),
            ));
        }
        let w = &self.liquidity.weights;
        if w.vwap < 0.0 || w.bb < 0.0 || w.kijun < 0.0 {
            return Err(FieldError::Config(
                "liquidity weights must be non-negative".into(),
            ));
        }
        if !(self.particle.epsilon > 0.0) {
            return Err(FieldError::Config("particle.epsilon must be > 0".into()));
        }
        let d = &self.dealer;
        for (name, p) in [("stay_prob", d.stay_prob), ("flip_prob", d.flip_prob)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(FieldError::Config(format!("dealer.{name} must be in [0, 1]")));
            }
        }
        let f = &self.forward;
        if f.max_horizon == 0 {
            return Err(FieldError::Config("forward.max_horizon must be >= 1".into()));
        }
        if !(f.mass_threshold > 0.0 && f.mass_threshold <= 1.0) {
            return Err(FieldError::Config(
                "forward.mass_threshold must be in (0, 1]".into(),
            ));
        }
        if self.symbols.is_empty() {
            return Err(FieldError::Config("symbols must not be empty".into()));
        }
        if self.cadence_seconds == 0 {
            return Err(FieldError::Config("cadence_seconds must be >= 1".into()));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(FieldError::Config(
                "provider.timeout_seconds must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
