use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    agent::{Agent, AgentIdentifier},
    error::GymResult,
    gym::forex::{action::Decisions, observation::Observation, space::ActionSpace},
};

// ================================================================================================
// Idle
// ================================================================================================

/// Never trades: submits `[0, 0, 0, 0]` for every symbol.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IdleAgent {
    num_symbols: usize,
}

impl IdleAgent {
    pub fn new(num_symbols: usize) -> Self {
        Self { num_symbols }
    }
}

impl Agent for IdleAgent {
    fn act(&mut self, _obs: &Observation) -> GymResult<Decisions> {
        Ok(Decisions::no_op(self.num_symbols))
    }

    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Idle
    }
}

// ================================================================================================
// Random
// ================================================================================================

/// Samples the action space uniformly. Seeded so that runs are reproducible.
#[derive(Debug, Clone, Serialize)]
pub struct RandomAgent {
    space: ActionSpace,
    seed: u64,
    #[serde(skip)]
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(space: ActionSpace, seed: u64) -> Self {
        Self {
            space,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _obs: &Observation) -> GymResult<Decisions> {
        Ok(self.space.sample(&mut self.rng))
    }

    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Random
    }

    /// Rewinds the generator so that every episode replays the same decisions.
    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_agent_never_trades() {
        let mut agent = IdleAgent::new(2);
        let obs = Observation::new(2, 1, 4);
        let decisions = agent.act(&obs).expect("act");
        assert_eq!(decisions, Decisions::no_op(2));
    }

    #[test]
    fn test_random_agent_replays_after_reset() {
        let mut agent = RandomAgent::new(ActionSpace::new(1), 11);
        let obs = Observation::new(1, 1, 4);

        let first: Vec<_> = (0..5).map(|_| agent.act(&obs).expect("act")).collect();
        agent.reset();
        let second: Vec<_> = (0..5).map(|_| agent.act(&obs).expect("act")).collect();
        assert_eq!(first, second);
    }
}
