use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    data::domain::{Money, SymbolId, TickIndex},
    gym::{
        Reward,
        forex::{
            simulator::Simulator,
            types::{CloseCause, Direction},
        },
    },
};

/// Account snapshot of one symbol after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolDiagnostics {
    pub symbol: SymbolId,
    pub balance: Money,
    pub equity: Money,
    pub margin: Money,
    pub order_direction: Direction,
    pub num_closes: usize,
    pub close_cause: CloseCause,
    pub cumulative_reward: f64,
}

impl From<&Simulator> for SymbolDiagnostics {
    fn from(sim: &Simulator) -> Self {
        let account = sim.account();
        Self {
            symbol: sim.symbol(),
            balance: account.balance(),
            equity: account.equity(),
            margin: account.margin(),
            order_direction: sim.direction(),
            num_closes: account.num_closes(),
            close_cause: account.close_cause(),
            cumulative_reward: account.cumulative_reward(),
        }
    }
}

/// Side-channel record returned by every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Cursor position after the step.
    pub tick: TickIndex,
    /// Reward of the step, summed over symbols.
    pub reward: Reward,
    pub symbols: SmallVec<[SymbolDiagnostics; 4]>,
}

impl Diagnostics {
    pub fn capture<'a>(
        tick: TickIndex,
        reward: Reward,
        simulators: impl IntoIterator<Item = &'a Simulator>,
    ) -> Self {
        Self {
            tick,
            reward,
            symbols: simulators.into_iter().map(SymbolDiagnostics::from).collect(),
        }
    }

    pub fn symbol(&self, symbol: SymbolId) -> Option<&SymbolDiagnostics> {
        self.symbols.get(symbol.0)
    }

    pub fn total_balance(&self) -> Money {
        self.symbols.iter().map(|s| s.balance).sum()
    }

    /// Reward accumulated since reset, summed over symbols.
    pub fn cumulative_reward(&self) -> f64 {
        self.symbols.iter().map(|s| s.cumulative_reward).sum()
    }

    pub fn total_closes(&self) -> usize {
        self.symbols.iter().map(|s| s.num_closes).sum()
    }
}
