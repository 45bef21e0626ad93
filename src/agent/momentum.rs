use std::sync::Arc;

use serde::Serialize;

use crate::{
    agent::{Agent, AgentIdentifier},
    error::{AgentError, GymResult},
    gym::forex::{
        action::{Decision, Decisions},
        observation::Observation,
    },
};

// ================================================================================================
// Window Momentum
// ================================================================================================

/// Follows the drift of one observation channel across the window.
///
/// Goes long when the newest value exceeds the oldest by more than `threshold`, short when
/// it falls below by more than `threshold`, and stays put otherwise. Opened orders use fixed
/// threshold and volume scales.
#[derive(Debug, Clone, Serialize)]
pub struct MomentumAgent {
    feature: usize,
    threshold: f64,
    take_profit: f64,
    stop_loss: f64,
    volume: f64,
}

impl MomentumAgent {
    pub fn new(feature: usize, threshold: f64) -> Self {
        Self {
            feature,
            threshold,
            take_profit: 0.5,
            stop_loss: 0.5,
            volume: 0.5,
        }
    }

    pub fn with_order_scales(self, take_profit: f64, stop_loss: f64, volume: f64) -> Self {
        Self {
            take_profit,
            stop_loss,
            volume,
            ..self
        }
    }

    fn decide(&self, oldest: f64, newest: f64) -> Decision {
        let drift = newest - oldest;
        if drift > self.threshold {
            Decision::long(self.take_profit, self.stop_loss, self.volume)
        } else if drift < -self.threshold {
            Decision::short(self.take_profit, self.stop_loss, self.volume)
        } else {
            Decision::flat()
        }
    }
}

impl Agent for MomentumAgent {
    fn act(&mut self, obs: &Observation) -> GymResult<Decisions> {
        obs.windows()
            .iter()
            .map(|window| -> GymResult<Decision> {
                let channel = window.channels().get(self.feature).ok_or_else(|| {
                    AgentError::Logic(format!(
                        "feature {} is not observed (window has {} channels)",
                        self.feature,
                        window.num_features()
                    ))
                })?;
                let decision = match (channel.oldest(), channel.newest()) {
                    (Some(&oldest), Some(&newest)) => self.decide(oldest, newest),
                    _ => Decision::flat(),
                };
                Ok(decision)
            })
            .collect()
    }

    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Named(Arc::new(format!(
            "Momentum(feature={}, threshold={})",
            self.feature, self.threshold
        )))
    }
}
