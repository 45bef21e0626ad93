use serde::{Deserialize, Serialize};

use crate::{impl_add_sub_primitive, impl_from_primitive, impl_neg_primitive};

// ================================================================================================
// Domain Strong Types (NewTypes)
// ================================================================================================

/// Represents a price level in the quote currency.
///
/// Used for: High, Low, Close, open prices and the spread (a price distance).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(pub f64);
impl_from_primitive!(Price, f64);
impl_add_sub_primitive!(Price, f64);
impl_neg_primitive!(Price, f64);

/// A price distance expressed in multiples of the symbol's pip cost.
///
/// Stop-loss and take-profit thresholds live in this unit, as does the
/// unrealized profit that is compared against them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Pips(pub f64);
impl_from_primitive!(Pips, f64);
impl_add_sub_primitive!(Pips, f64);
impl_neg_primitive!(Pips, f64);

/// Order size in standard lots.
///
/// # Semantics
/// - Brokers only accept multiples of [`Lots::STEP`]; [`Lots::from_raw`] truncates towards
///   zero onto that grid (it never rounds up).
/// - Anything at or below [`Lots::MIN`] is lifted to [`Lots::MIN`]; an order is never
///   rejected for being too small.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Lots(pub f64);
impl_from_primitive!(Lots, f64);

impl Lots {
    /// Granularity of the lot grid.
    pub const STEP: f64 = 0.01;

    /// Smallest tradable order.
    pub const MIN: Lots = Lots(0.01);

    /// Truncates a raw lot amount to two decimals and applies the minimum lot floor.
    pub fn from_raw(raw: f64) -> Self {
        let truncated = (raw * 100.0).trunc() / 100.0;
        if truncated <= Self::MIN.0 {
            Self::MIN
        } else {
            Self(truncated)
        }
    }

    /// Number of base-currency units this order controls.
    pub fn units(&self, lot_size: f64) -> f64 {
        self.0 * lot_size
    }
}

/// Minimum price increment of a symbol. Converts price distances into [`Pips`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PipCost(pub f64);
impl_from_primitive!(PipCost, f64);

impl Default for PipCost {
    fn default() -> Self {
        Self(0.00001)
    }
}

impl PipCost {
    pub fn to_pips(&self, distance: Price) -> Pips {
        Pips(distance.0 / self.0)
    }

    pub fn to_price(&self, pips: Pips) -> Price {
        Price(pips.0 * self.0)
    }

    /// Scales the pip cost into a price distance, e.g. a spread of `n` pips.
    pub fn times(&self, multiplier: f64) -> Price {
        Price(self.0 * multiplier)
    }
}

/// Account currency amount (balance, equity, margin, profit).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(pub f64);
impl_from_primitive!(Money, f64);
impl_add_sub_primitive!(Money, f64);
impl_neg_primitive!(Money, f64);

impl Money {
    pub const ZERO: Money = Money(0.0);
}

/// Position of a symbol within the environment's symbol list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SymbolId(pub usize);
impl_from_primitive!(SymbolId, usize);

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "symbol#{}", self.0)
    }
}

/// Position of a row within the tick tables. Shared by action and observation tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TickIndex(pub usize);
impl_from_primitive!(TickIndex, usize);

impl TickIndex {
    /// Number of ticks elapsed since `earlier`, saturating at zero.
    pub fn since(&self, earlier: TickIndex) -> usize {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::fmt::Display for TickIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
