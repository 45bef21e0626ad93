use serde::{Deserialize, Serialize};

use crate::{
    error::GymResult,
    gym::forex::{action::Decisions, diagnostics::Diagnostics, observation::Observation},
    impl_add_sub_primitive, impl_from_primitive, impl_neg_primitive,
};

pub mod forex;

/// A reward value, normalized by the initial capital of the account.
///
/// A reward of `-1.0` means "lost the equivalent of the whole starting capital"; the
/// environment's hard penalties (`-5.0` for a margin call, `-10.0` for an idle episode)
/// are expressed on the same scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Reward(pub f64);
impl_from_primitive!(Reward, f64);
impl_add_sub_primitive!(Reward, f64);
impl_neg_primitive!(Reward, f64);

/// A Gym-like environment driven one tick at a time.
pub trait Env {
    /// Restores the initial account state and re-seeds the observation.
    fn reset(&mut self) -> GymResult<&Observation>;

    /// Applies one decision per symbol to the current tick and advances time.
    ///
    /// Returns the next observation, the step reward, how the step ended and a
    /// diagnostics record of every symbol's account.
    fn step(
        &mut self,
        decisions: &Decisions,
    ) -> GymResult<(&Observation, Reward, StepOutcome, Diagnostics)>;
}

/// Represents the lifecycle status of the trading environment.
///
/// # Lifecycle
///
/// The environment follows a finite state machine (FSM) with the following valid transitions. Other transitions return an error.
///
/// ```md
/// Current State (optional step context)   | Action  | Next State  | Notes
/// ----------------------------------------|---------|-------------|-------------------------------------
/// `Running` (margin call or final tick)   | step()  | EpisodeDone | Episode terminates
/// `Running`                               | step()  | Running     | Continue within episode
/// `Ready` / `Running` / `EpisodeDone`     | reset() | Running     | Restart from the first window
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvStatus {
    /// Initial state. The environment is waiting for `reset()` to be called.
    Ready,

    /// An episode is active and the environment is ready for `step()` calls.
    Running,

    /// The active episode has reached a terminal state.
    ///
    /// A call to `reset()` is required to start the next episode.
    EpisodeDone,
}

impl EnvStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_episode_done(&self) -> bool {
        matches!(self, Self::EpisodeDone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    InProgress,
    /// margin call liquidated an account
    Terminated,
    /// end of data
    Truncated,
}

impl StepOutcome {
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated)
    }

    /// The Gym `done` flag: the episode is over either way.
    pub fn is_terminal(&self) -> bool {
        self.is_terminated() || self.is_truncated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_outcome_terminal_flags() {
        assert!(!StepOutcome::InProgress.is_terminal());
        assert!(StepOutcome::Terminated.is_terminal());
        assert!(StepOutcome::Truncated.is_terminal());
        assert!(StepOutcome::Terminated.is_terminated());
        assert!(!StepOutcome::Terminated.is_truncated());
    }

    #[test]
    fn test_reward_sums() {
        let total: Reward = [Reward(0.5), Reward(-1.5), Reward(0.25)].into_iter().sum();
        assert_eq!(total, Reward(-0.75));
    }
}
