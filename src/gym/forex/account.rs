use serde::{Deserialize, Serialize};

use crate::{data::domain::Money, gym::forex::types::CloseCause};

/// Capital bookkeeping of one symbol's account.
///
/// # Invariants
/// - `equity == balance + unrealized profit` after every mark-to-market.
/// - `margin` is non-zero only while an order is open.
/// - `num_closes` counts completed trades; a margin call never increments it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    initial_capital: Money,
    balance: Money,
    equity: Money,
    margin: Money,
    previous_balance: Money,
    cumulative_reward: f64,
    num_closes: usize,
    close_cause: CloseCause,
    previous_close_cause: CloseCause,
}

impl Account {
    pub fn new(capital: f64) -> Self {
        let capital = Money(capital);
        Self {
            initial_capital: capital,
            balance: capital,
            equity: capital,
            margin: Money::ZERO,
            previous_balance: capital,
            cumulative_reward: 0.0,
            num_closes: 0,
            close_cause: CloseCause::None,
            previous_close_cause: CloseCause::None,
        }
    }

    /// Restores the account to its initial capital.
    pub fn reset(&mut self) {
        *self = Self::new(self.initial_capital.0);
    }

    pub fn initial_capital(&self) -> Money {
        self.initial_capital
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn equity(&self) -> Money {
        self.equity
    }

    pub fn margin(&self) -> Money {
        self.margin
    }

    /// Sum of the shaped rewards of every step since the last reset.
    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn num_closes(&self) -> usize {
        self.num_closes
    }

    pub fn close_cause(&self) -> CloseCause {
        self.close_cause
    }

    pub fn previous_close_cause(&self) -> CloseCause {
        self.previous_close_cause
    }

    /// Realized capital gained since the previous step.
    pub fn balance_increment(&self) -> Money {
        self.balance - self.previous_balance
    }

    pub fn is_margin_call(&self) -> bool {
        self.equity < self.margin
    }

    pub(super) fn mark_to_market(&mut self, unrealized: Money) {
        self.equity = self.balance + unrealized;
    }

    pub(super) fn reserve_margin(&mut self, margin: Money) {
        self.margin += margin;
    }

    /// Realizes the current equity and releases the margin of a closed order.
    pub(super) fn settle(&mut self, cause: CloseCause) {
        self.balance = self.equity;
        self.margin = Money::ZERO;
        self.record_cause(cause);
    }

    /// Forced liquidation: the account is wiped out.
    pub(super) fn liquidate(&mut self) {
        self.balance = Money::ZERO;
        self.equity = Money::ZERO;
        self.margin = Money::ZERO;
        self.record_cause(CloseCause::MarginCall);
    }

    /// Zeroes balance and equity; used by terminal reward shaping.
    pub(super) fn wipe(&mut self) {
        self.balance = Money::ZERO;
        self.equity = Money::ZERO;
    }

    /// Closes the books for the current step.
    pub(super) fn end_step(&mut self, reward: f64) {
        self.previous_balance = self.balance;
        self.cumulative_reward += reward;
    }

    fn record_cause(&mut self, cause: CloseCause) {
        if cause.counts_as_trade() {
            self.num_closes += 1;
        }
        self.previous_close_cause = self.close_cause;
        self.close_cause = cause;
    }
}
