use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    data::{
        calendar::{HourBand, Weekday},
        domain::{PipCost, Price},
        row::ActionRow,
    },
    error::{EnvError, GymResult},
};

/// The part of the week during which liquidity is considered normal.
///
/// A bar is *illiquid* when its day falls outside `weekdays` or its hour falls outside
/// `hours`. Bars whose day column cannot be decoded are treated as illiquid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityWindow {
    pub weekdays: BTreeSet<Weekday>,
    pub hours: HourBand,
}

impl Default for LiquidityWindow {
    fn default() -> Self {
        Self {
            weekdays: Weekday::working_week(),
            hours: HourBand::full_day(),
        }
    }
}

impl LiquidityWindow {
    pub fn is_liquid(&self, row: &ActionRow) -> bool {
        row.weekday().is_some_and(|day| self.weekdays.contains(&day))
            && self.hours.contains(row.hour_of_day)
    }
}

/// Static spread model: a multiple of the pip cost that widens in thin markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadConfig {
    /// Spread in pips during regular hours.
    pub liquid_multiplier: f64,
    /// Spread in pips outside the liquidity window.
    pub illiquid_multiplier: f64,
    pub window: LiquidityWindow,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            liquid_multiplier: 20.0,
            illiquid_multiplier: 60.0,
            window: LiquidityWindow::default(),
        }
    }
}

impl SpreadConfig {
    /// Spread as a price distance for the given bar.
    pub fn spread(&self, row: &ActionRow, pip: PipCost) -> Price {
        if self.window.is_liquid(row) {
            pip.times(self.liquid_multiplier)
        } else {
            pip.times(self.illiquid_multiplier)
        }
    }

    pub(crate) fn validate(&self) -> GymResult<()> {
        if !(self.liquid_multiplier >= 0.0 && self.illiquid_multiplier >= 0.0) {
            return Err(EnvError::InvalidConfig(format!(
                "spread multipliers must be non-negative (liquid: {}, illiquid: {})",
                self.liquid_multiplier, self.illiquid_multiplier
            ))
            .into());
        }
        self.window.hours.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(day_of_week: f64, hour: f64) -> [f64; 10] {
        [1.1, 1.0, 1.05, 1.05, 10.0, 1.0, 1.0, day_of_week, hour, 0.0]
    }

    #[test]
    fn test_weekday_bar_uses_liquid_spread() {
        let cfg = SpreadConfig::default();
        let f = fields(3.0, 14.0);
        let row = ActionRow::decode(&f).expect("row");
        let spread = cfg.spread(&row, PipCost(0.00001));
        assert!((spread.0 - 0.0002).abs() < 1e-12, "got {spread:?}");
    }

    #[test]
    fn test_weekend_bar_uses_illiquid_spread() {
        let cfg = SpreadConfig::default();
        for day in [0.0, 6.0] {
            let f = fields(day, 14.0);
            let row = ActionRow::decode(&f).expect("row");
            let spread = cfg.spread(&row, PipCost(0.00001));
            assert!((spread.0 - 0.0006).abs() < 1e-12, "day {day}: got {spread:?}");
        }
    }

    #[test]
    fn test_hour_band_widens_spread() {
        let cfg = SpreadConfig {
            window: LiquidityWindow {
                hours: HourBand::new(2, 22).expect("valid band"),
                ..LiquidityWindow::default()
            },
            ..SpreadConfig::default()
        };
        let night = fields(2.0, 23.0);
        let day = fields(2.0, 12.0);
        let pip = PipCost(0.0001);

        let night_spread = cfg.spread(&ActionRow::decode(&night).expect("row"), pip);
        let day_spread = cfg.spread(&ActionRow::decode(&day).expect("row"), pip);
        assert!(night_spread > day_spread);
    }

    #[test]
    fn test_undecodable_day_is_illiquid() {
        let window = LiquidityWindow::default();
        let f = fields(9.0, 12.0);
        assert!(!window.is_liquid(&ActionRow::decode(&f).expect("row")));
    }

    #[test]
    fn test_negative_multiplier_is_invalid() {
        let cfg = SpreadConfig {
            liquid_multiplier: -1.0,
            ..SpreadConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
