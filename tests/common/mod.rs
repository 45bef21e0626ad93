#![allow(dead_code)]

use std::path::PathBuf;

use forex_gym::prelude::*;

pub const CAPITAL: f64 = 10_000.0;
pub const WINDOW_SIZE: usize = 8;
pub const NUM_FEATURES: usize = 4;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn eurusd_files() -> (PathBuf, PathBuf) {
    (
        fixture("eurusd_action.csv"),
        fixture("eurusd_observation.csv"),
    )
}

pub fn setup_config(num_symbols: usize) -> EnvConfig {
    EnvConfig::new(CAPITAL)
        .with_num_symbols(num_symbols)
        .with_num_features(NUM_FEATURES)
        .with_window_size(WINDOW_SIZE)
        .with_pip_cost(vec![PipCost(0.0001); num_symbols])
}

pub fn setup_env(num_symbols: usize) -> GymResult<ForexEnv> {
    let files = vec![eurusd_files(); num_symbols];
    ForexEnv::from_csv(setup_config(num_symbols), &files)
}

/// One full episode driven by a fixed decision batch; returns every step's reward and
/// diagnostics.
pub fn run_fixed_episode(
    env: &mut ForexEnv,
    decisions: &Decisions,
) -> GymResult<Vec<(Reward, StepOutcome, Diagnostics)>> {
    env.reset()?;
    let mut trajectory = Vec::new();
    loop {
        let (_, reward, outcome, diagnostics) = env.step(decisions)?;
        trajectory.push((reward, outcome, diagnostics));
        if outcome.is_terminal() {
            return Ok(trajectory);
        }
    }
}
