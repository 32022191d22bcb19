//! agora-sim - run a scenario file
//!
//! ```text
//! agora-sim --file scenario.json --runs 3 price=10.50
//! ```
//!
//! Trailing `name=value` arguments are available to the scenario as
//! `${name}`; `${runIndex}` is the zero-based repetition number.

use std::path::PathBuf;
use std::process::ExitCode;

use agora_runner::{AgentFactory, ParameterStore, ScenarioConfig, ScenarioError, StopReason};
use clap::Parser;
use log::{error, info, warn};

/// Deterministic discrete-event market simulation
#[derive(Parser, Debug)]
#[command(name = "agora-sim")]
#[command(about = "Runs a market simulation scenario")]
#[command(version)]
struct Args {
    /// Scenario file
    #[arg(short, long, default_value = "simulation.json")]
    file: PathBuf,

    /// Number of repetitions
    #[arg(short, long, default_value_t = 1)]
    runs: u32,

    /// Only log warnings and errors
    #[arg(short, long)]
    silent: bool,

    /// Scenario parameters as name=value
    params: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.silent { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ScenarioError> {
    let mut store = ParameterStore::from_assignments(&args.params)?;
    let scenario = ScenarioConfig::from_file(&args.file)?;
    let factory = AgentFactory::default();
    info!(
        "loaded {} with {} agent(s)",
        args.file.display(),
        scenario.agents.len()
    );

    for run_index in 0..args.runs {
        store.set("runIndex", run_index.to_string());
        let started = chrono::Utc::now();

        let mut simulation = scenario.build(&factory, &store)?;
        let report = simulation.run()?;

        let elapsed = chrono::Utc::now() - started;
        info!(
            "run {}: {:?} at t={}, {} delivered, {} dropped, {} pending, {} ms",
            run_index,
            report.stop_reason,
            report.final_timestamp,
            report.events_delivered,
            report.events_dropped,
            report.events_pending,
            elapsed.num_milliseconds()
        );
        for (agent, reason) in &report.disabled_agents {
            warn!("run {}: {} was disabled: {}", run_index, agent, reason);
        }
        for failure in &report.agent_errors {
            warn!(
                "run {}: {} failed on {} at t={}: {}",
                run_index, failure.agent, failure.message_type, failure.delivery, failure.error
            );
        }
        if report.stop_reason == StopReason::EventLimit {
            warn!("run {}: event limit reached", run_index);
        }
    }
    Ok(())
}
