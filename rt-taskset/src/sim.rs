/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deterministic virtual-tick runner.
//!
//! Stands in for the scheduler kernel on a host: time only moves when a body
//! consumes it (through a [`SimulatedCost`](crate::bodies::SimulatedCost)
//! workload) or when nothing is ready and the clock jumps to the next event.
//!
//! # Dispatch rule
//! Among tasks whose release point has been reached, the highest priority
//! runs first; ties go to the earliest release point, then to creation
//! order.  Bodies run to completion.  When no task is ready the idle hook
//! fires and the clock jumps to the next release or stimulus event.
//!
//! Every served release is recorded as a [`ReleaseRecord`] so timing
//! properties (period spacing, bursts after overruns) can be checked.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::clock::{ManualClock, Tick, TickClock};
use crate::config::InputEvent;
use crate::io::SimulatedGpio;
use crate::monitor::MissReport;
use crate::system::SystemContext;
use crate::task::{PeriodicTask, TaskId};

/// One served release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub task: TaskId,
    /// Scheduled release tick.
    pub release: Tick,
    /// Tick at which the body started.
    pub start: Tick,
    /// Tick at which the body finished.
    pub end: Tick,
}

/// Virtual-time executor for a started task set.
pub struct Simulator {
    clock: ManualClock,
    context: Arc<SystemContext>,
    tasks: Vec<PeriodicTask>,
    gpio: Option<Arc<SimulatedGpio>>,
    stimulus: VecDeque<InputEvent>,
    records: Vec<ReleaseRecord>,
}

impl Simulator {
    /// Start every task at the clock's current tick.
    ///
    /// `context.clock` must read the same counter as `clock`.
    pub fn new(
        clock: ManualClock,
        context: Arc<SystemContext>,
        mut tasks: Vec<PeriodicTask>,
    ) -> Self {
        for task in &mut tasks {
            task.start(&context);
        }
        Self {
            clock,
            context,
            tasks,
            gpio: None,
            stimulus: VecDeque::new(),
            records: Vec::new(),
        }
    }

    /// Apply `events` to `gpio` as the clock reaches them.  Events must be
    /// sorted by tick.
    pub fn with_stimulus(mut self, gpio: Arc<SimulatedGpio>, events: Vec<InputEvent>) -> Self {
        self.gpio = Some(gpio);
        self.stimulus = events.into();
        self
    }

    /// Serve every release scheduled before `horizon`.
    ///
    /// Returns the number of releases served by this call.
    pub fn run_until(&mut self, horizon: Tick) -> usize {
        let before = self.records.len();
        loop {
            let now = self.clock.now();
            self.apply_stimulus(now);

            if let Some(i) = self.pick_ready(now, horizon) {
                self.serve(i);
                continue;
            }

            let next_release = self
                .tasks
                .iter()
                .map(PeriodicTask::next_release)
                .filter(|&r| r < horizon)
                .min();
            let Some(next_release) = next_release else {
                break;
            };
            let next = self
                .stimulus
                .front()
                .map_or(next_release, |e| e.at.min(next_release));

            self.context.probe.on_idle();
            self.clock.set(next);
        }

        let served = self.records.len() - before;
        debug!(horizon, served, now = self.clock.now(), "simulation segment done");
        served
    }

    /// Serve exactly one release if one is due before `horizon`, advancing
    /// the clock to it if necessary.
    pub fn step(&mut self, horizon: Tick) -> Option<ReleaseRecord> {
        let next = self
            .tasks
            .iter()
            .map(PeriodicTask::next_release)
            .filter(|&r| r < horizon)
            .min()?;
        if self.clock.now() < next {
            self.context.probe.on_idle();
            self.clock.set(next);
        }
        let now = self.clock.now();
        self.apply_stimulus(now);
        let i = self.pick_ready(now, horizon)?;
        Some(self.serve(i))
    }

    /// All releases served so far, in execution order.
    pub fn records(&self) -> &[ReleaseRecord] {
        &self.records
    }

    /// Records of one task.
    pub fn records_of(&self, task: TaskId) -> Vec<ReleaseRecord> {
        self.records.iter().copied().filter(|r| r.task == task).collect()
    }

    pub fn context(&self) -> &Arc<SystemContext> {
        &self.context
    }

    pub fn tasks(&self) -> &[PeriodicTask] {
        &self.tasks
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    /// Current miss counters.
    pub fn report(&self) -> MissReport {
        self.context.monitor.snapshot()
    }

    fn pick_ready(&self, now: Tick, horizon: Tick) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.next_release() <= now && t.next_release() < horizon)
            .min_by_key(|(i, t)| (std::cmp::Reverse(t.spec().priority), t.next_release(), *i))
            .map(|(i, _)| i)
    }

    fn serve(&mut self, i: usize) -> ReleaseRecord {
        let start = self.clock.now();
        let task = &mut self.tasks[i];
        let release = task.execute(&self.context);
        let record = ReleaseRecord {
            task: task.id(),
            release,
            start,
            end: self.clock.now(),
        };
        self.records.push(record);
        record
    }

    fn apply_stimulus(&mut self, now: Tick) {
        while self.stimulus.front().is_some_and(|e| e.at <= now) {
            if let (Some(event), Some(gpio)) = (self.stimulus.pop_front(), &self.gpio) {
                gpio.set(event.pin, event.level);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
