/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Synthetic CPU load.
//!
//! A [`SyntheticLoad`] task only burns time.  *How* it burns time is a
//! [`SyntheticWorkload`] strategy, so the same task definition can be
//! retargeted without touching the task logic:
//!
//! * [`BusyLoop`] – a fixed iteration count, tuned per target clock speed.
//! * [`SpinFor`] – spin until a wall-clock duration has elapsed (`spin_us`
//!   in the configuration).
//! * [`SimulatedCost`] – advance a [`ManualClock`] by a fixed number of ticks
//!   (virtual-time runs).

use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::clock::{ManualClock, Tick};
use crate::task::{Activation, TaskBody};

/// A unit of CPU-bound work with a known cost shape.
pub trait SyntheticWorkload: Send {
    /// Perform the work once.  Must not block or yield.
    fn execute(&mut self);
}

// ── BusyLoop ──────────────────────────────────────────────────────────────────

/// Count to `iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyLoop {
    pub iterations: u32,
}

impl BusyLoop {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    fn spin(&self) {
        let mut i = 0u32;
        while black_box(i) < self.iterations {
            i += 1;
        }
    }
}

impl SyntheticWorkload for BusyLoop {
    fn execute(&mut self) {
        self.spin();
    }
}

// ── SpinFor ───────────────────────────────────────────────────────────────────

/// Spin until `duration` of wall-clock time has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinFor {
    pub duration: Duration,
}

impl SpinFor {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl SyntheticWorkload for SpinFor {
    fn execute(&mut self) {
        let started = Instant::now();
        while started.elapsed() < self.duration {
            std::hint::spin_loop();
        }
    }
}

// ── SimulatedCost ─────────────────────────────────────────────────────────────

/// Consume `ticks` of virtual time on a [`ManualClock`].
#[derive(Debug, Clone)]
pub struct SimulatedCost {
    clock: ManualClock,
    ticks: Tick,
}

impl SimulatedCost {
    pub fn new(clock: ManualClock, ticks: Tick) -> Self {
        Self { clock, ticks }
    }
}

impl SyntheticWorkload for SimulatedCost {
    fn execute(&mut self) {
        self.clock.advance(self.ticks);
    }
}

// ── SyntheticLoad ─────────────────────────────────────────────────────────────

/// Task body that runs its workload once per release.
pub struct SyntheticLoad {
    workload: Box<dyn SyntheticWorkload>,
}

impl SyntheticLoad {
    pub fn new(workload: Box<dyn SyntheticWorkload>) -> Self {
        Self { workload }
    }
}

impl TaskBody for SyntheticLoad {
    fn run(&mut self, _act: &Activation<'_>) {
        self.workload.execute();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;

    #[test]
    fn simulated_cost_advances_the_clock() {
        let clock = ManualClock::new();
        let mut w = SimulatedCost::new(clock.clone(), 12);
        w.execute();
        w.execute();
        assert_eq!(clock.now(), 24);
    }

    #[test]
    fn spin_for_takes_at_least_its_duration() {
        let mut w = SpinFor::new(Duration::from_millis(2));
        let started = Instant::now();
        w.execute();
        assert!(started.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn busy_loop_terminates() {
        let mut w = BusyLoop::new(33_220);
        w.execute();
    }
}
