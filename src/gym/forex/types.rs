use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::data::domain::{Pips, PipCost, Price};

/// Side of an open order.
#[derive(
    Copy,
    Clone,
    Debug,
    EnumString,
    Display,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    PartialOrd,
    Ord,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum TradeType {
    Long,
    Short,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn direction(&self) -> Direction {
        match self {
            TradeType::Long => Direction::Long,
            TradeType::Short => Direction::Short,
        }
    }

    /// Unrealized profit of an order of this side, measured against the bar's worst price.
    ///
    /// - **Long** exits at the bid: the bar's `low`.
    /// - **Short** exits at the ask: the bar's `high` widened by the spread.
    pub fn profit_pips(
        &self,
        open_price: Price,
        low: Price,
        high: Price,
        spread: Price,
        pip: PipCost,
    ) -> Pips {
        match self {
            TradeType::Long => pip.to_pips(low - open_price),
            TradeType::Short => pip.to_pips(open_price - (high + spread)),
        }
    }
}

/// Position state of a symbol, as reported to the agent.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    EnumString,
    Display,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    #[default]
    Flat,
    Long,
    Short,
}

impl Direction {
    /// Reads the direction component of a decision: only its sign matters.
    pub fn from_signal(value: f64) -> Self {
        if value > 0.0 {
            Direction::Long
        } else if value < 0.0 {
            Direction::Short
        } else {
            Direction::Flat
        }
    }

    /// Signed encoding `-1 / 0 / 1` used in flat diagnostics records.
    pub fn as_signed(&self) -> i8 {
        match self {
            Direction::Flat => 0,
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Direction::Flat)
    }
}

/// Why the last order of a symbol was closed.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    EnumString,
    EnumIter,
    EnumCount,
    Display,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CloseCause {
    #[default]
    None,
    MarginCall,
    StopLoss,
    TakeProfit,
    NormalClose,
}

impl CloseCause {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// `true` for the close events that count as a completed trade.
    pub fn counts_as_trade(&self) -> bool {
        matches!(
            self,
            CloseCause::StopLoss | CloseCause::TakeProfit | CloseCause::NormalClose
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_signal_uses_sign_only() {
        assert_eq!(Direction::from_signal(0.001), Direction::Long);
        assert_eq!(Direction::from_signal(1.0), Direction::Long);
        assert_eq!(Direction::from_signal(-0.3), Direction::Short);
        assert_eq!(Direction::from_signal(0.0), Direction::Flat);
        assert_eq!(Direction::from_signal(-0.0), Direction::Flat);
    }

    #[test]
    fn test_direction_signed_encoding() {
        assert_eq!(Direction::Flat.as_signed(), 0);
        assert_eq!(Direction::Long.as_signed(), 1);
        assert_eq!(Direction::Short.as_signed(), -1);
        assert_eq!(TradeType::Short.direction(), Direction::Short);
    }

    #[test]
    fn test_long_profit_uses_low_of_bar() {
        let pip = PipCost(0.0001);
        let pips = TradeType::Long.profit_pips(
            Price(1.1000),
            Price(1.0990),
            Price(1.1050),
            Price(0.0002),
            pip,
        );
        assert!((pips.0 + 10.0).abs() < 1e-6, "got {pips:?}");
    }

    #[test]
    fn test_short_profit_uses_high_plus_spread() {
        let pip = PipCost(0.0001);
        let pips = TradeType::Short.profit_pips(
            Price(1.1000),
            Price(1.0900),
            Price(1.0980),
            Price(0.0002),
            pip,
        );
        // 1.1000 - (1.0980 + 0.0002) = 0.0018
        assert!((pips.0 - 18.0).abs() < 1e-6, "got {pips:?}");
    }

    #[test]
    fn test_close_cause_trade_counting() {
        assert!(!CloseCause::None.counts_as_trade());
        assert!(!CloseCause::MarginCall.counts_as_trade());
        assert!(CloseCause::StopLoss.counts_as_trade());
        assert!(CloseCause::TakeProfit.counts_as_trade());
        assert!(CloseCause::NormalClose.counts_as_trade());
        assert_eq!(CloseCause::MarginCall.to_string(), "margin_call");
    }
}
