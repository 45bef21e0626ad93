use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    error::{AgentError, GymResult},
    gym::forex::types::Direction,
};

/// Number of components in a decision vector.
pub const DECISION_COMPONENTS: usize = 4;

/// One symbol's trading decision for a single tick.
///
/// Every component lives in `[-1, 1]`:
///
/// | idx | field         | meaning                                                  |
/// |-----|---------------|----------------------------------------------------------|
/// | 0   | `take_profit` | scale of `max_tp` used as take-profit when opening       |
/// | 1   | `stop_loss`   | scale of `max_sl` used as stop-loss when opening         |
/// | 2   | `volume`      | scale of the equity fraction committed when opening      |
/// | 3   | `direction`   | sign selects Long (> 0), Short (< 0) or no-op (0)        |
///
/// The scales are applied raw: a negative `take_profit` produces a negative threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Decision {
    pub take_profit: f64,
    pub stop_loss: f64,
    pub volume: f64,
    pub direction: f64,
}

impl Decision {
    /// The do-nothing decision `[0, 0, 0, 0]`.
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn long(take_profit: f64, stop_loss: f64, volume: f64) -> Self {
        Self {
            take_profit,
            stop_loss,
            volume,
            direction: 1.0,
        }
    }

    pub fn short(take_profit: f64, stop_loss: f64, volume: f64) -> Self {
        Self {
            take_profit,
            stop_loss,
            volume,
            direction: -1.0,
        }
    }

    pub fn signal(&self) -> Direction {
        Direction::from_signal(self.direction)
    }

    pub fn as_array(&self) -> [f64; DECISION_COMPONENTS] {
        [self.take_profit, self.stop_loss, self.volume, self.direction]
    }

    /// Stateless bounds check: every component must be finite and within `[-1, 1]`.
    pub fn validate(&self) -> GymResult<()> {
        if let Some((idx, value)) = self
            .as_array()
            .into_iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || !(-1.0..=1.0).contains(v))
        {
            return Err(AgentError::InvalidInput(format!(
                "Decision component {idx} must be a finite value in [-1, 1]. Got: {value}"
            ))
            .into());
        }
        Ok(())
    }
}

impl From<[f64; DECISION_COMPONENTS]> for Decision {
    fn from([take_profit, stop_loss, volume, direction]: [f64; DECISION_COMPONENTS]) -> Self {
        Self {
            take_profit,
            stop_loss,
            volume,
            direction,
        }
    }
}

// ================================================================================================
// Per-Symbol Batching
// ================================================================================================

/// One [`Decision`] per traded symbol, in symbol order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Decisions(pub SmallVec<[Decision; 4]>);

impl Decisions {
    /// Returns a batch in which every symbol does nothing.
    pub fn no_op(num_symbols: usize) -> Self {
        Self(SmallVec::from_elem(Decision::flat(), num_symbols))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.0.iter()
    }

    /// Validates the batch shape and every decision inside it.
    pub fn validate(&self, num_symbols: usize) -> GymResult<()> {
        if self.len() != num_symbols {
            return Err(AgentError::InvalidInput(format!(
                "Expected one decision per symbol ({num_symbols}). Got: {}",
                self.len()
            ))
            .into());
        }
        self.iter().try_for_each(Decision::validate)
    }
}

impl From<Decision> for Decisions {
    fn from(decision: Decision) -> Self {
        Self(SmallVec::from_elem(decision, 1))
    }
}

impl From<Vec<Decision>> for Decisions {
    fn from(vec: Vec<Decision>) -> Self {
        Self(SmallVec::from_vec(vec))
    }
}

impl FromIterator<Decision> for Decisions {
    fn from_iter<T: IntoIterator<Item = Decision>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
