pub mod baseline;
pub mod momentum;

use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};
use strum::{Display, EnumString};

use crate::{
    error::GymResult,
    gym::forex::{action::Decisions, observation::Observation},
};

/// Identifies an agent in evaluation summaries and logs.
///
/// The `String` of `Named` can hold any custom name; the remaining variants name the
/// baseline agents shipped with the crate.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    Default,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentIdentifier {
    /// A custom user-defined agent.
    #[strum(to_string = "{0}")]
    Named(Arc<String>),

    Idle,

    #[default]
    Random,
}

pub trait Agent {
    /// Decides one trading decision per symbol from the current observation.
    fn act(&mut self, obs: &Observation) -> GymResult<Decisions>;

    /// Optional agent name for logging/debugging.
    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Named(Arc::new(
            "UnnamedAgent: override Agent::identifier()".to_string(),
        ))
    }

    /// Reset internal state at the end of an episode. Default is no-op.
    fn reset(&mut self) {}
}

impl Agent for Box<dyn Agent + Send> {
    fn act(&mut self, obs: &Observation) -> GymResult<Decisions> {
        (**self).act(obs)
    }

    fn identifier(&self) -> AgentIdentifier {
        (**self).identifier()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_display() {
        assert_eq!(AgentIdentifier::Idle.to_string(), "IDLE");
        assert_eq!(AgentIdentifier::Random.to_string(), "RANDOM");
        assert_eq!(
            AgentIdentifier::Named(Arc::new("trend-16".to_string())).to_string(),
            "trend-16"
        );
    }
}
