use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    data::domain::PipCost,
    error::{EnvError, GymResult, IoError},
    gym::forex::spread::SpreadConfig,
};

/// Units of base currency in one standard lot.
pub const STANDARD_LOT: f64 = 100_000.0;

/// Configuration blueprint for building a [`ForexEnv`](crate::gym::forex::env::ForexEnv).
///
/// # Core Components
///
/// **Shape:**
/// - `num_symbols`: independent single-position accounts stepped in lockstep
/// - `num_features`: observation channels per symbol (leading observation columns)
/// - `num_components`: depth reported by the observation space
/// - `window_size`: number of past ticks per channel
///
/// **Account:**
/// - `capital`: initial balance of every symbol's account
/// - `leverage`, `max_volume`: order sizing (`equity × max_volume × leverage`)
///
/// **Risk (in pips):**
/// - `max_sl`, `max_tp`: scaled by the decision vector at open time
/// - `min_sl`, `min_tp`: validated against the maxima only; thresholds are not clamped
///
/// **Trading frequency:**
/// - `min_order_time`: ticks an order must be held before an opposing decision closes it
/// - `min_orders`: completed trades per episode below which rewards are penalized
///
/// # Example
///
/// ```
/// # use forex_gym::prelude::*;
/// let cfg = EnvConfig::default()
///     .with_capital(10_000.0)
///     .with_window_size(16)
///     .with_min_orders(4);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    num_symbols: usize,
    num_features: usize,
    num_components: usize,
    capital: f64,
    min_sl: f64,
    min_tp: f64,
    max_sl: f64,
    max_tp: f64,
    max_orders: usize,
    max_volume: f64,
    leverage: f64,
    window_size: usize,
    min_order_time: usize,
    min_orders: usize,
    pip_cost: Vec<PipCost>,
    spread: SpreadConfig,
    lot_size: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_symbols: 1,
            num_features: 1,
            num_components: 1,
            capital: 10_000.0,
            min_sl: 100.0,
            min_tp: 100.0,
            max_sl: 1_000.0,
            max_tp: 1_000.0,
            max_orders: 1,
            max_volume: 0.1,
            leverage: 100.0,
            window_size: 30,
            min_order_time: 0,
            min_orders: 4,
            pip_cost: vec![PipCost::default()],
            spread: SpreadConfig::default(),
            lot_size: STANDARD_LOT,
        }
    }
}

// ================================================================================================
// Builder
// ================================================================================================

impl EnvConfig {
    /// Default configuration with the given starting capital per symbol.
    pub fn new(capital: f64) -> Self {
        Self::default().with_capital(capital)
    }

    /// Sets the number of symbols. The pip cost list is resized with the default pip cost.
    pub fn with_num_symbols(self, num_symbols: usize) -> Self {
        let mut pip_cost = self.pip_cost;
        pip_cost.resize(num_symbols, PipCost::default());
        Self {
            num_symbols,
            max_orders: self.max_orders.max(num_symbols),
            pip_cost,
            ..self
        }
    }

    pub fn with_num_features(self, num_features: usize) -> Self {
        Self {
            num_features,
            ..self
        }
    }

    pub fn with_num_components(self, num_components: usize) -> Self {
        Self {
            num_components,
            ..self
        }
    }

    pub fn with_capital(self, capital: f64) -> Self {
        Self { capital, ..self }
    }

    pub fn with_stop_loss_range(self, min_sl: f64, max_sl: f64) -> Self {
        Self {
            min_sl,
            max_sl,
            ..self
        }
    }

    pub fn with_take_profit_range(self, min_tp: f64, max_tp: f64) -> Self {
        Self {
            min_tp,
            max_tp,
            ..self
        }
    }

    pub fn with_max_orders(self, max_orders: usize) -> Self {
        Self { max_orders, ..self }
    }

    pub fn with_max_volume(self, max_volume: f64) -> Self {
        Self { max_volume, ..self }
    }

    pub fn with_leverage(self, leverage: f64) -> Self {
        Self { leverage, ..self }
    }

    pub fn with_window_size(self, window_size: usize) -> Self {
        Self {
            window_size,
            ..self
        }
    }

    pub fn with_min_order_time(self, min_order_time: usize) -> Self {
        Self {
            min_order_time,
            ..self
        }
    }

    pub fn with_min_orders(self, min_orders: usize) -> Self {
        Self { min_orders, ..self }
    }

    /// Pip cost per symbol, in symbol order.
    pub fn with_pip_cost(self, pip_cost: Vec<PipCost>) -> Self {
        Self { pip_cost, ..self }
    }

    pub fn with_spread(self, spread: SpreadConfig) -> Self {
        Self { spread, ..self }
    }

    pub fn with_lot_size(self, lot_size: f64) -> Self {
        Self { lot_size, ..self }
    }
}

// ================================================================================================
// Accessors
// ================================================================================================

impl EnvConfig {
    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn min_sl(&self) -> f64 {
        self.min_sl
    }

    pub fn min_tp(&self) -> f64 {
        self.min_tp
    }

    pub fn max_sl(&self) -> f64 {
        self.max_sl
    }

    pub fn max_tp(&self) -> f64 {
        self.max_tp
    }

    pub fn max_orders(&self) -> usize {
        self.max_orders
    }

    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn min_order_time(&self) -> usize {
        self.min_order_time
    }

    pub fn min_orders(&self) -> usize {
        self.min_orders
    }

    pub fn pip_cost(&self) -> &[PipCost] {
        &self.pip_cost
    }

    pub fn spread(&self) -> &SpreadConfig {
        &self.spread
    }

    pub fn lot_size(&self) -> f64 {
        self.lot_size
    }
}

// ================================================================================================
// Parsing & Validation
// ================================================================================================

impl EnvConfig {
    /// Parses a JSON document.
    ///
    /// The shape options, account options and risk bounds are required; `min_order_time`,
    /// `min_orders`, `pip_cost`, `spread` and `lot_size` fall back to their defaults.
    pub fn from_json_str(json: &str) -> GymResult<Self> {
        let raw: RawEnvConfig = serde_json::from_str(json).map_err(IoError::from)?;
        let cfg = raw.try_into_config()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> GymResult<Self> {
        let json = std::fs::read_to_string(path).map_err(IoError::from)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> GymResult<()> {
        fn invalid(msg: String) -> GymResult<()> {
            Err(EnvError::InvalidConfig(msg).into())
        }

        if self.num_symbols == 0 {
            return invalid("num_symbols must be at least 1".to_string());
        }
        if self.num_features == 0 {
            return invalid("num_features must be at least 1".to_string());
        }
        if self.window_size == 0 {
            return invalid("window_size must be at least 1".to_string());
        }
        if self.min_orders == 0 {
            return invalid("min_orders must be at least 1".to_string());
        }
        if !(self.capital.is_finite() && self.capital > 0.0) {
            return invalid(format!("capital must be positive. Got: {}", self.capital));
        }
        if !(self.leverage.is_finite() && self.leverage > 0.0) {
            return invalid(format!("leverage must be positive. Got: {}", self.leverage));
        }
        if !(self.max_volume.is_finite() && self.max_volume > 0.0) {
            return invalid(format!(
                "max_volume must be positive. Got: {}",
                self.max_volume
            ));
        }
        if !(self.lot_size.is_finite() && self.lot_size > 0.0) {
            return invalid(format!("lot_size must be positive. Got: {}", self.lot_size));
        }
        if self.max_orders < self.num_symbols {
            return invalid(format!(
                "max_orders ({}) must allow one order per symbol ({})",
                self.max_orders, self.num_symbols
            ));
        }
        if self.min_sl > self.max_sl {
            return invalid(format!(
                "min_sl ({}) must not exceed max_sl ({})",
                self.min_sl, self.max_sl
            ));
        }
        if self.min_tp > self.max_tp {
            return invalid(format!(
                "min_tp ({}) must not exceed max_tp ({})",
                self.min_tp, self.max_tp
            ));
        }
        if self.pip_cost.len() != self.num_symbols {
            return invalid(format!(
                "expected one pip cost per symbol ({}). Got: {}",
                self.num_symbols,
                self.pip_cost.len()
            ));
        }
        if let Some(pip) = self.pip_cost.iter().find(|p| !(p.0.is_finite() && p.0 > 0.0)) {
            return invalid(format!("pip cost must be positive. Got: {}", pip.0));
        }
        self.spread.validate()
    }
}

/// Wire shape of [`EnvConfig`]: every option optional so that absent keys can be
/// reported by name.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnvConfig {
    num_symbols: Option<usize>,
    num_features: Option<usize>,
    num_components: Option<usize>,
    capital: Option<f64>,
    min_sl: Option<f64>,
    min_tp: Option<f64>,
    max_sl: Option<f64>,
    max_tp: Option<f64>,
    max_orders: Option<usize>,
    max_volume: Option<f64>,
    leverage: Option<f64>,
    window_size: Option<usize>,
    min_order_time: Option<usize>,
    min_orders: Option<usize>,
    pip_cost: Option<Vec<PipCost>>,
    spread: Option<SpreadConfig>,
    lot_size: Option<f64>,
}

impl RawEnvConfig {
    fn try_into_config(self) -> GymResult<EnvConfig> {
        fn required<T>(value: Option<T>, name: &'static str) -> GymResult<T> {
            value.ok_or_else(|| EnvError::MissingOption(name).into())
        }

        let defaults = EnvConfig::default();
        let num_symbols = required(self.num_symbols, "num_symbols")?;

        Ok(EnvConfig {
            num_symbols,
            num_features: required(self.num_features, "num_features")?,
            num_components: required(self.num_components, "num_components")?,
            capital: required(self.capital, "capital")?,
            min_sl: required(self.min_sl, "min_sl")?,
            min_tp: required(self.min_tp, "min_tp")?,
            max_sl: required(self.max_sl, "max_sl")?,
            max_tp: required(self.max_tp, "max_tp")?,
            max_orders: required(self.max_orders, "max_orders")?,
            max_volume: required(self.max_volume, "max_volume")?,
            leverage: required(self.leverage, "leverage")?,
            window_size: required(self.window_size, "window_size")?,
            min_order_time: self.min_order_time.unwrap_or(defaults.min_order_time),
            min_orders: self.min_orders.unwrap_or(defaults.min_orders),
            pip_cost: self
                .pip_cost
                .unwrap_or_else(|| vec![PipCost::default(); num_symbols]),
            spread: self.spread.unwrap_or(defaults.spread),
            lot_size: self.lot_size.unwrap_or(defaults.lot_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GymError;

    use super::*;

    const FULL_JSON: &str = r#"{
        "num_symbols": 2,
        "num_features": 3,
        "num_components": 4,
        "capital": 10000.0,
        "min_sl": 100.0,
        "min_tp": 100.0,
        "max_sl": 1000.0,
        "max_tp": 1000.0,
        "max_orders": 2,
        "max_volume": 0.1,
        "leverage": 100.0,
        "window_size": 8
    }"#;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn test_json_applies_defaults_for_optional_options() {
        let cfg = EnvConfig::from_json_str(FULL_JSON).expect("valid config");
        assert_eq!(cfg.num_symbols(), 2);
        assert_eq!(cfg.window_size(), 8);
        assert_eq!(cfg.min_orders(), 4);
        assert_eq!(cfg.min_order_time(), 0);
        assert_eq!(cfg.pip_cost(), &[PipCost(0.00001), PipCost(0.00001)]);
        assert_eq!(cfg.lot_size(), STANDARD_LOT);
    }

    #[test]
    fn test_json_missing_required_option_is_named() {
        let json = FULL_JSON.replace("\"leverage\": 100.0,", "");
        let err = EnvConfig::from_json_str(&json).unwrap_err();
        assert!(
            matches!(err, GymError::Env(EnvError::MissingOption("leverage"))),
            "got {err:?}"
        );
    }

    #[test]
    fn test_json_unknown_option_is_rejected() {
        let json = FULL_JSON.replace("\"window_size\": 8", "\"window_size\": 8, \"obs_ticks\": 3");
        assert!(matches!(
            EnvConfig::from_json_str(&json),
            Err(GymError::Io(IoError::Json(_)))
        ));
    }

    #[test]
    fn test_validation_rejects_inconsistent_options() {
        let base = EnvConfig::default();

        assert!(base.clone().with_capital(0.0).validate().is_err());
        assert!(base.clone().with_leverage(-1.0).validate().is_err());
        assert!(base.clone().with_window_size(0).validate().is_err());
        assert!(base.clone().with_min_orders(0).validate().is_err());
        assert!(
            base.clone()
                .with_stop_loss_range(500.0, 100.0)
                .validate()
                .is_err()
        );
        assert!(
            base.clone()
                .with_pip_cost(vec![PipCost(0.0001), PipCost(0.0001)])
                .validate()
                .is_err(),
            "pip costs must match num_symbols"
        );
        assert!(
            base.with_num_symbols(2).with_max_orders(1).validate().is_err(),
            "one open order per symbol must be possible"
        );
    }

    #[test]
    fn test_with_num_symbols_resizes_pip_costs() {
        let cfg = EnvConfig::default().with_num_symbols(3);
        assert_eq!(cfg.pip_cost().len(), 3);
        assert_eq!(cfg.max_orders(), 3);
        assert!(cfg.validate().is_ok());
    }
}
