use serde::{Deserialize, Serialize};

use crate::gym::forex::{account::Account, types::CloseCause};

/// Penalty, in multiples of the initial capital, for a margin call.
pub const MARGIN_CALL_PENALTY: f64 = 5.0;

/// Penalty, in multiples of the initial capital, for ending an episode under-traded or idle.
pub const INACTIVITY_PENALTY: f64 = 10.0;

/// Per-step reward shaping for a single symbol.
///
/// The raw signal is the average of the realized balance increment and an equity bonus spread
/// over the episode horizon. It is then shaped by trading frequency, overridden by a margin
/// call, shaped again on the final tick and finally normalized by the initial capital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardShaper {
    capital: f64,
    num_ticks: f64,
    min_orders: f64,
}

impl RewardShaper {
    pub fn new(capital: f64, num_ticks: usize, min_orders: usize) -> Self {
        Self {
            capital,
            num_ticks: num_ticks as f64,
            min_orders: min_orders as f64,
        }
    }

    /// Computes the normalized reward of the step that just ran on `account`.
    ///
    /// On the final tick the account may be wiped out as part of the terminal penalty.
    pub fn shape(&self, account: &mut Account, is_final: bool) -> f64 {
        let closes = account.num_closes() as f64;
        let shortfall = 1.0 - closes / self.min_orders;

        let bonus = (account.equity().0 - self.capital) / self.num_ticks;
        let mut reward = (account.balance_increment().0 + bonus) / 2.0;

        if closes < self.min_orders / 2.0 {
            if reward > 0.0 {
                reward *= closes / self.min_orders;
            }
            if reward <= 0.0 {
                reward -= self.capital / self.num_ticks * shortfall;
            }
        } else if closes < self.min_orders && reward <= 0.0 {
            reward -= self.capital / (10.0 * self.num_ticks) * shortfall;
        }

        if account.close_cause() == CloseCause::MarginCall {
            reward = -MARGIN_CALL_PENALTY * self.capital;
        }

        if is_final {
            if closes < self.min_orders {
                reward = -INACTIVITY_PENALTY * self.capital * shortfall;
                account.wipe();
            }
            if account.equity().0 == self.capital {
                reward = -INACTIVITY_PENALTY * self.capital;
                account.wipe();
            }
        }

        reward / self.capital
    }
}
