/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use rt_taskset::clock::{ManualClock, MonotonicClock, Tick};
use rt_taskset::config::TaskSetConfig;
use rt_taskset::io::{SimulatedGpio, WriterSink};
use rt_taskset::monitor::MissReport;
use rt_taskset::probe::{InstrumentationHook, NoProbe, TracingProbe};
use rt_taskset::runtime::RealtimeRunner;
use rt_taskset::sim::Simulator;
use rt_taskset::system::{gpio_probe, Peripherals, TaskSet, WorkloadMode};

// ── CLI argument definition ───────────────────────────────────────────────────

/// What the entry/exit/idle probe does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProbeMode {
    /// No instrumentation.
    Off,
    /// Trace-level log events.
    Log,
    /// Toggle the configured probe pins on the simulated GPIO bank.
    Gpio,
}

/// Periodic task set with a bounded message channel and deadline monitor.
///
/// Example:
///   rt-taskset --config taskset.yaml --simulate --ticks 1000
#[derive(Debug, Parser)]
#[command(
    name = "rt-taskset",
    about = "Periodic task set with bounded message passing and deadline monitoring",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML task-set configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Run length in ticks (default: one hyperperiod when simulating,
    /// until Ctrl-C otherwise).
    #[arg(short = 't', long = "ticks")]
    ticks: Option<Tick>,

    /// Use a deterministic virtual clock instead of wall-clock time.
    #[arg(short = 's', long = "simulate", default_value_t = false)]
    simulate: bool,

    /// Instrumentation probe.
    #[arg(long = "probe", value_enum, default_value_t = ProbeMode::Log)]
    probe: ProbeMode,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=trace).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        config   = ?cli.config,
        ticks    = ?cli.ticks,
        simulate = cli.simulate,
        probe    = ?cli.probe,
        "Configuration"
    );

    // ── Load task-set configuration ───────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => match TaskSetConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load task-set configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No --config provided – running the built-in six-task application");
            TaskSetConfig::default_config()
        }
    };

    let outcome = if cli.simulate {
        run_simulated(&config, &cli)
    } else {
        run_wall_clock(&config, &cli).await
    };

    match outcome {
        Ok(report) => {
            info!("Deadline monitor:\n{report}");
            if report.total_misses() > 0 {
                warn!(total = report.total_misses(), "deadline misses recorded");
            }
        }
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

// ── Run modes ─────────────────────────────────────────────────────────────────

fn peripherals(
    cli: &Cli,
    config: &TaskSetConfig,
    gpio: &Arc<SimulatedGpio>,
    workload: WorkloadMode,
) -> Peripherals {
    let probe: Arc<dyn InstrumentationHook> = match cli.probe {
        ProbeMode::Off => Arc::new(NoProbe),
        ProbeMode::Log => Arc::new(TracingProbe),
        ProbeMode::Gpio => Arc::new(gpio_probe(config, gpio.clone())),
    };
    Peripherals {
        inputs: gpio.clone(),
        sink: Box::new(WriterSink::stdout()),
        probe,
        workload,
    }
}

fn run_simulated(config: &TaskSetConfig, cli: &Cli) -> Result<MissReport> {
    let clock = ManualClock::new();
    let gpio = Arc::new(SimulatedGpio::new());
    let set = TaskSet::build(
        config,
        Arc::new(clock.clone()),
        peripherals(cli, config, &gpio, WorkloadMode::Simulated(clock.clone())),
    )
    .context("Failed to create task set")?;

    let horizon = cli.ticks.unwrap_or(set.analysis().simulation_length());
    let (context, tasks) = set.into_parts();
    let mut sim =
        Simulator::new(clock, context, tasks).with_stimulus(gpio, config.stimulus.clone());

    let served = sim.run_until(horizon);
    info!(served, horizon, now = sim.now(), "Simulation finished");
    Ok(sim.report())
}

async fn run_wall_clock(config: &TaskSetConfig, cli: &Cli) -> Result<MissReport> {
    let clock = MonotonicClock::start(config.tick)?;
    let gpio = Arc::new(SimulatedGpio::new());
    let set = TaskSet::build(
        config,
        Arc::new(clock),
        peripherals(cli, config, &gpio, WorkloadMode::Busy),
    )
    .context("Failed to create task set")?;

    let (context, tasks) = set.into_parts();
    let runner = RealtimeRunner::new(clock, Arc::clone(&context), tasks)
        .with_stimulus(gpio, config.stimulus.clone());

    tokio::select! {
        served = runner.run(cli.ticks) => {
            let served = served.context("Task loop panicked")?;
            info!(served, "Run finished");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Ctrl-C received, stopping");
        }
    }

    Ok(context.monitor.snapshot())
}
