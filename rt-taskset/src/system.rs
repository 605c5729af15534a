/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process-wide context and task-set assembly.
//!
//! ```text
//! TaskSetConfig ──validate──► SystemContext { clock, channel, monitor, probe }
//!        │                          ▲ shared by reference (Arc)
//!        └──── bodies ─────► Vec<PeriodicTask> ──► runtime / sim
//! ```
//!
//! The context is created exactly once, before any task runs, and every
//! component reaches shared state through it; there are no module-level
//! globals.  Any failure while building it is a [`SetupError`] and the task
//! set is never handed to a runner.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::{self, TaskSetAnalysis, DEFAULT_HYPERPERIOD_LIMIT};
use crate::bodies::{
    Announcer, BusyLoop, DrainToSink, EdgeMonitor, SimulatedCost, SpinFor, SyntheticLoad,
    SyntheticWorkload,
};
use crate::channel::MessageChannel;
use crate::clock::{ManualClock, TickClock};
use crate::config::{BodyConfig, TaskConfig, TaskSetConfig};
use crate::error::SetupError;
use crate::io::{DigitalInput, DigitalOutput, OutputSink, PinId};
use crate::monitor::DeadlineMonitor;
use crate::probe::{GpioProbe, InstrumentationHook};
use crate::task::{PeriodicTask, TaskBody, TaskId, TaskSpec};

// ── SystemContext ─────────────────────────────────────────────────────────────

/// Shared state reachable from every task body.
pub struct SystemContext {
    pub clock: Arc<dyn TickClock>,
    pub channel: MessageChannel,
    pub monitor: DeadlineMonitor,
    pub probe: Arc<dyn InstrumentationHook>,
}

impl SystemContext {
    pub fn new(
        clock: Arc<dyn TickClock>,
        channel: MessageChannel,
        monitor: DeadlineMonitor,
        probe: Arc<dyn InstrumentationHook>,
    ) -> Self {
        Self {
            clock,
            channel,
            monitor,
            probe,
        }
    }
}

// ── Peripherals ───────────────────────────────────────────────────────────────

/// How load tasks spend their time.
#[derive(Debug, Clone)]
pub enum WorkloadMode {
    /// Real busy loops with the configured iteration counts.
    Busy,
    /// Advance this virtual clock by each task's configured `cost`.
    Simulated(ManualClock),
}

/// External services the task bodies are wired to.
pub struct Peripherals {
    pub inputs: Arc<dyn DigitalInput>,
    pub sink: Box<dyn OutputSink>,
    pub probe: Arc<dyn InstrumentationHook>,
    pub workload: WorkloadMode,
}

/// Build the probe that drives each task's configured pin.
pub fn gpio_probe(config: &TaskSetConfig, output: Arc<dyn DigitalOutput>) -> GpioProbe {
    let port = config.probe.port;
    let probe = config
        .tasks
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.probe_pin.map(|pin| (TaskId::new(i), PinId::new(port, pin))))
        .fold(GpioProbe::new(output), |probe, (task, pin)| {
            probe.with_task_pin(task, pin)
        });
    match config.probe.idle() {
        Some(idle) => probe.with_idle_pin(idle),
        None => probe,
    }
}

// ── TaskSet ───────────────────────────────────────────────────────────────────

/// A fully created task set, ready to be started by a runner.
pub struct TaskSet {
    context: Arc<SystemContext>,
    tasks: Vec<PeriodicTask>,
    analysis: TaskSetAnalysis,
}

impl TaskSet {
    /// Validate `config` and create the context and every task.
    ///
    /// # Errors
    /// Any [`SetupError`]; nothing has run when this fails.
    pub fn build(
        config: &TaskSetConfig,
        clock: Arc<dyn TickClock>,
        peripherals: Peripherals,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let specs = config.specs();
        let timing: Vec<(&TaskSpec, Option<u64>)> = specs
            .iter()
            .zip(&config.tasks)
            .map(|(spec, t)| (spec, t.cost))
            .collect();
        let analysis = analysis::analyse(&timing, DEFAULT_HYPERPERIOD_LIMIT)?;

        let channel = MessageChannel::new(config.channel_capacity)?;
        let monitor = DeadlineMonitor::for_tasks(&specs);
        let context = Arc::new(SystemContext::new(
            clock,
            channel,
            monitor,
            peripherals.probe,
        ));

        let mut sink = Some(peripherals.sink);
        let tasks: Vec<PeriodicTask> = config
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let body = make_body(task, &peripherals.inputs, &mut sink, &peripherals.workload);
                PeriodicTask::new(TaskId::new(i), task.spec.clone(), body)
            })
            .collect();

        if sink.is_some() {
            warn!("no drain task configured, the channel will fill and drop messages");
        }

        info!(
            tasks = tasks.len(),
            channel_capacity = config.channel_capacity,
            hyperperiod = analysis.hyperperiod,
            "task set created"
        );

        Ok(Self {
            context,
            tasks,
            analysis,
        })
    }

    pub fn context(&self) -> &Arc<SystemContext> {
        &self.context
    }

    pub fn tasks(&self) -> &[PeriodicTask] {
        &self.tasks
    }

    pub fn analysis(&self) -> &TaskSetAnalysis {
        &self.analysis
    }

    /// Hand the context and tasks to a runner.
    pub fn into_parts(self) -> (Arc<SystemContext>, Vec<PeriodicTask>) {
        (self.context, self.tasks)
    }
}

fn make_body(
    task: &TaskConfig,
    inputs: &Arc<dyn DigitalInput>,
    sink: &mut Option<Box<dyn OutputSink>>,
    workload: &WorkloadMode,
) -> Box<dyn TaskBody> {
    match &task.body {
        BodyConfig::EdgeMonitor { input, label } => {
            Box::new(EdgeMonitor::new(Arc::clone(inputs), *input, label))
        }
        BodyConfig::Announcer { text } => Box::new(Announcer::new(text.as_str())),
        // validate() guarantees at most one drain, so the sink is still here.
        BodyConfig::Drain => match sink.take() {
            Some(sink) => Box::new(DrainToSink::new(sink)),
            None => Box::new(DrainToSink::new(Box::new(crate::io::MemorySink::new()))),
        },
        BodyConfig::Load {
            iterations,
            spin_us,
        } => {
            let work: Box<dyn SyntheticWorkload> = match (workload, spin_us) {
                (WorkloadMode::Busy, Some(us)) => {
                    Box::new(SpinFor::new(Duration::from_micros(*us)))
                }
                (WorkloadMode::Busy, None) => Box::new(BusyLoop::new(*iterations)),
                (WorkloadMode::Simulated(clock), _) => {
                    if task.cost.is_none() {
                        warn!(
                            task = %task.spec.name,
                            "load task has no cost; simulating zero ticks"
                        );
                    }
                    Box::new(SimulatedCost::new(clock.clone(), task.cost.unwrap_or(0)))
                }
            };
            Box::new(SyntheticLoad::new(work))
        }
    }
}

/// Minimal context for unit tests: capacity-10 channel, no probe.
#[cfg(test)]
pub(crate) fn test_context(clock: &ManualClock, specs: &[TaskSpec]) -> SystemContext {
    SystemContext::new(
        Arc::new(clock.clone()),
        MessageChannel::new(crate::channel::DEFAULT_CHANNEL_CAPACITY).unwrap(),
        DeadlineMonitor::for_tasks(specs),
        Arc::new(crate::probe::NoProbe),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
