use std::{path::Path, sync::Arc};

use indicatif::{ProgressBar, ProgressStyle};
use itertools::izip;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    agent::{Agent, AgentIdentifier},
    data::{
        domain::{SymbolId, TickIndex},
        table::SymbolData,
    },
    error::{DataError, EnvError, GymResult},
    gym::{
        Env, EnvStatus, Reward, StepOutcome,
        forex::{
            action::Decisions,
            config::EnvConfig,
            diagnostics::Diagnostics,
            observation::{Observation, ObservationWindow},
            reward::RewardShaper,
            simulator::Simulator,
            space::{ActionSpace, ObservationSpace},
        },
    },
    sim::feed::TickFeed,
};

/// Result of running one agent through one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub agent: AgentIdentifier,
    pub total_reward: Reward,
    pub num_steps: usize,
    pub outcome: StepOutcome,
    pub diagnostics: Diagnostics,
}

/// Forex trading environment: one independent single-position simulator per symbol,
/// stepped in lockstep over aligned tick tables.
///
/// Cloning is cheap: tick tables are shared, account state is copied. Every clone is a
/// fully independent simulation.
#[derive(Debug, Clone)]
pub struct ForexEnv {
    config: Arc<EnvConfig>,
    feeds: Vec<TickFeed>,
    simulators: Vec<Simulator>,
    observation: Observation,
    shaper: RewardShaper,
    status: EnvStatus,
}

// ================================================================================================
// Building
// ================================================================================================

impl ForexEnv {
    /// Builds an environment over one [`SymbolData`] per configured symbol.
    ///
    /// # Errors
    /// - the configuration is invalid or does not match the number of tables
    /// - the symbols do not share the same number of ticks
    /// - an observation table has fewer columns than `num_features`
    /// - the tables are too short to seed the window and step at least once
    pub fn new(config: EnvConfig, data: Vec<SymbolData>) -> GymResult<Self> {
        config.validate()?;
        if data.len() != config.num_symbols() {
            return Err(EnvError::InvalidConfig(format!(
                "expected tick data for {} symbols. Got: {}",
                config.num_symbols(),
                data.len()
            ))
            .into());
        }

        let num_ticks = data.first().map_or(0, SymbolData::num_rows);
        for (symbol, symbol_data) in data.iter().enumerate() {
            if symbol_data.num_rows() != num_ticks {
                return Err(DataError::SymbolLengthMismatch {
                    symbol,
                    expected: num_ticks,
                    found: symbol_data.num_rows(),
                }
                .into());
            }
            let columns = symbol_data.observation().num_columns();
            if columns < config.num_features() {
                return Err(DataError::InsufficientColumns {
                    required: config.num_features(),
                    found: columns,
                    msg: format!("observation table of {}", SymbolId(symbol)),
                }
                .into());
            }
        }

        let mut feeds: Vec<TickFeed> = data
            .into_iter()
            .map(|d| TickFeed::new(Arc::new(d)))
            .collect();
        for feed in &mut feeds {
            feed.rewind(config.window_size())?;
        }

        let simulators = config
            .pip_cost()
            .iter()
            .enumerate()
            .map(|(i, &pip)| Simulator::new(SymbolId(i), pip, config.capital()))
            .collect();
        let shaper = RewardShaper::new(config.capital(), num_ticks, config.min_orders());
        let observation = Observation::new(
            config.num_symbols(),
            config.num_features(),
            config.window_size(),
        );

        debug!(
            num_symbols = config.num_symbols(),
            num_ticks,
            window_size = config.window_size(),
            "Forex Environment Built"
        );

        Ok(Self {
            config: Arc::new(config),
            feeds,
            simulators,
            observation,
            shaper,
            status: EnvStatus::Ready,
        })
    }

    /// Loads headerless action/observation CSV pairs, one pair per symbol.
    pub fn from_csv<P: AsRef<Path>>(config: EnvConfig, files: &[(P, P)]) -> GymResult<Self> {
        let data = files
            .iter()
            .map(|(action, observation)| SymbolData::from_csv(action, observation))
            .collect::<GymResult<Vec<_>>>()?;
        Self::new(config, data)
    }
}

// ================================================================================================
// Accessors
// ================================================================================================

impl ForexEnv {
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn status(&self) -> EnvStatus {
        self.status
    }

    /// Shared tick cursor of all symbols.
    pub fn cursor(&self) -> TickIndex {
        self.feeds.first().map_or(TickIndex(0), TickFeed::cursor)
    }

    pub fn num_ticks(&self) -> usize {
        self.feeds.first().map_or(0, TickFeed::num_ticks)
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn simulators(&self) -> &[Simulator] {
        &self.simulators
    }

    pub fn simulator(&self, symbol: SymbolId) -> Option<&Simulator> {
        self.simulators.get(symbol.0)
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::from(self.config.as_ref())
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::from(self.config.as_ref())
    }

    /// Diagnostics of the current state without stepping.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::capture(self.cursor(), Reward::default(), &self.simulators)
    }
}

// ================================================================================================
// Evaluation
// ================================================================================================

impl ForexEnv {
    /// Runs `agent` through one full episode, starting with a reset.
    pub fn evaluate_agent<T: Agent>(&mut self, agent: &mut T) -> GymResult<EpisodeSummary> {
        self.reset()?;
        let mut total_reward = Reward::default();
        let mut num_steps = 0;

        let (outcome, diagnostics) = loop {
            let decisions = agent.act(&self.observation)?;
            let (_, reward, outcome, diagnostics) = self.step(&decisions)?;
            total_reward += reward;
            num_steps += 1;
            if outcome.is_terminal() {
                break (outcome, diagnostics);
            }
        };
        agent.reset();

        Ok(EpisodeSummary {
            agent: agent.identifier(),
            total_reward,
            num_steps,
            outcome,
            diagnostics,
        })
    }

    /// Evaluates many agents in parallel and returns their summaries, best total reward first.
    ///
    /// Each agent runs on its own clone of the environment; no simulation state is shared
    /// between workers.
    pub fn evaluate_agents<T>(&self, agents: Vec<T>) -> GymResult<Vec<EpisodeSummary>>
    where
        T: Agent + Send,
    {
        let pb = progress_bar(agents.len() as u64)?;
        pb.set_message("Running evaluation...");

        let mut summaries = agents
            .into_par_iter()
            .map(|mut agent| {
                let mut worker_env = self.clone();
                let summary = worker_env.evaluate_agent(&mut agent);
                pb.inc(1);
                summary
            })
            .collect::<GymResult<Vec<_>>>()?;

        pb.finish_with_message("Evaluation complete.");
        summaries.sort_by(|a, b| b.total_reward.0.total_cmp(&a.total_reward.0));
        Ok(summaries)
    }
}

// ================================================================================================
// Gym Loop
// ================================================================================================

impl Env for ForexEnv {
    #[tracing::instrument(skip(self), fields(status = ?self.status))]
    fn reset(&mut self) -> GymResult<&Observation> {
        let window_size = self.config.window_size();
        for (feed, sim, window) in izip!(
            &mut self.feeds,
            &mut self.simulators,
            self.observation.windows_mut()
        ) {
            feed.rewind(window_size)?;
            sim.reset();
            *window = ObservationWindow::new(self.config.num_features(), window_size);
            window.seed(feed)?;
        }

        // Per lifecycle, the state is ALWAYS Running after a reset.
        self.status = EnvStatus::Running;
        info!(tick = %self.cursor(), "Environment Reset Initiated.");
        Ok(&self.observation)
    }

    #[tracing::instrument(skip(self, decisions), fields(tick = %self.cursor()))]
    fn step(
        &mut self,
        decisions: &Decisions,
    ) -> GymResult<(&Observation, Reward, StepOutcome, Diagnostics)> {
        self.check_step_status()?;
        decisions.validate(self.config.num_symbols())?;

        let tick = self.cursor();
        let is_final = self.feeds.iter().any(TickFeed::is_final_step);

        // 1. Per-symbol transition on the current bar, then observe it
        let mut reward = Reward::default();
        let mut margin_call = false;
        for (feed, sim, decision, window) in izip!(
            &self.feeds,
            &mut self.simulators,
            decisions.iter(),
            self.observation.windows_mut()
        ) {
            let row = feed.current_row()?;
            let transition = sim.step(&row, decision, tick, is_final, &self.config, &self.shaper);
            reward += Reward(transition.reward);
            margin_call |= transition.margin_call;
            window.push_row(feed.current_observation_row()?)?;
        }

        // 2. Time passes: t -> t+1
        self.feeds.iter_mut().for_each(TickFeed::advance);

        // 3. Outcome and status
        let outcome = self.evaluate_outcome(margin_call);
        if outcome.is_terminal() {
            self.status = EnvStatus::EpisodeDone;
            info!(
                ?outcome,
                final_tick = %self.cursor(),
                "Episode Finished"
            );
        }

        let diagnostics = Diagnostics::capture(self.cursor(), reward, &self.simulators);
        Ok((&self.observation, reward, outcome, diagnostics))
    }
}

impl ForexEnv {
    fn check_step_status(&self) -> GymResult<()> {
        use EnvStatus::*;
        match self.status {
            Running => Ok(()),
            Ready => Err(EnvError::InvalidState(
                "Environment is not started. Call `reset()` before stepping.".to_string(),
            )
            .into()),
            EpisodeDone => Err(EnvError::InvalidState(
                "Episode is done. Call `reset()` before stepping.".to_string(),
            )
            .into()),
        }
    }

    fn evaluate_outcome(&self, margin_call: bool) -> StepOutcome {
        if margin_call {
            StepOutcome::Terminated
        } else if self.feeds.iter().any(TickFeed::is_exhausted) {
            StepOutcome::Truncated
        } else {
            StepOutcome::InProgress
        }
    }
}

// ================================================================================================
// Helper Functions
// ================================================================================================
fn progress_bar(capacity: u64) -> GymResult<ProgressBar> {
    let bar = ProgressBar::new(capacity);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta_precise}) {msg}")
            .map_err(EnvError::ProgressBar)?
            .progress_chars("#>-"));
    Ok(bar)
}
