use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use forex_gym::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let cfg = EnvConfig::from_json_file(fixtures.join("env_config.json"))
        .context("loading environment configuration")?;
    let files = [(
        fixtures.join("eurusd_action.csv"),
        fixtures.join("eurusd_observation.csv"),
    )];

    let build_start = Instant::now();
    let mut env = ForexEnv::from_csv(cfg, &files).context("building environment")?;
    let build_time = build_start.elapsed();

    // Single agent, sequential
    let mut agent = RandomAgent::new(env.action_space(), 7);
    let run_start = Instant::now();
    let summary = env.evaluate_agent(&mut agent)?;
    let run_time = run_start.elapsed();
    info!(
        agent = %summary.agent,
        total_reward = summary.total_reward.0,
        steps = summary.num_steps,
        outcome = ?summary.outcome,
        "Single Evaluation Finished"
    );

    // Population, parallel
    let mut agents: Vec<Box<dyn Agent + Send>> = (0..32)
        .map(|seed| Box::new(RandomAgent::new(env.action_space(), seed)) as Box<dyn Agent + Send>)
        .collect();
    agents.push(Box::new(IdleAgent::new(1)));
    agents.push(Box::new(MomentumAgent::new(0, 0.02)));
    let leaderboard = env.evaluate_agents(agents)?;

    println!("\n--- Leaderboard (top 5) ---");
    for (rank, entry) in leaderboard.iter().take(5).enumerate() {
        println!(
            "{:>2}. {:<40} reward {:>10.4}  balance {:>10.2}  closes {:>3}",
            rank + 1,
            entry.agent.to_string(),
            entry.diagnostics.cumulative_reward(),
            entry.diagnostics.total_balance().0,
            entry.diagnostics.total_closes()
        );
    }

    println!("\n--- Evaluation Timings ---");
    println!("1. Environment build time:  {build_time:?}");
    println!("2. Random agent run time:   {run_time:?}");

    Ok(())
}

// ================================================================================================
// Tracing Configuration
// ================================================================================================

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_current_span(true)
        .with_thread_names(true)
        .init();
}
