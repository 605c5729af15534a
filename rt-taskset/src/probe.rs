/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Trace-probe instrumentation.
//!
//! An external instrument (logic analyser, scope) watches one signal per task
//! that is high while the task's body runs, plus an idle signal pulsed
//! whenever no task is ready.  The system never reads these signals back, so
//! the hook is kept out of the task bodies entirely: [`PeriodicTask`] calls
//! [`on_enter`](InstrumentationHook::on_enter) and
//! [`on_exit`](InstrumentationHook::on_exit) around every body, and the
//! runners call [`on_idle`](InstrumentationHook::on_idle).
//!
//! [`PeriodicTask`]: crate::task::PeriodicTask

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::io::{DigitalOutput, Level, PinId};
use crate::task::TaskId;

/// Cross-cutting hook invoked at body entry/exit and when the CPU idles.
pub trait InstrumentationHook: Send + Sync {
    fn on_enter(&self, task: TaskId);
    fn on_exit(&self, task: TaskId);
    fn on_idle(&self) {}
}

// ── NoProbe ───────────────────────────────────────────────────────────────────

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProbe;

impl InstrumentationHook for NoProbe {
    fn on_enter(&self, _task: TaskId) {}
    fn on_exit(&self, _task: TaskId) {}
}

// ── TracingProbe ──────────────────────────────────────────────────────────────

/// Emits `trace`-level events instead of toggling pins.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProbe;

impl InstrumentationHook for TracingProbe {
    fn on_enter(&self, task: TaskId) {
        trace!(task = task.index(), "probe high");
    }

    fn on_exit(&self, task: TaskId) {
        trace!(task = task.index(), "probe low");
    }

    fn on_idle(&self) {
        trace!("idle");
    }
}

// ── GpioProbe ─────────────────────────────────────────────────────────────────

/// Drives one output pin per task through a [`DigitalOutput`].
///
/// Tasks without an assigned pin are skipped.
pub struct GpioProbe {
    output: Arc<dyn DigitalOutput>,
    pins: HashMap<TaskId, PinId>,
    idle_pin: Option<PinId>,
}

impl GpioProbe {
    pub fn new(output: Arc<dyn DigitalOutput>) -> Self {
        Self {
            output,
            pins: HashMap::new(),
            idle_pin: None,
        }
    }

    /// Assign `pin` to `task`.
    pub fn with_task_pin(mut self, task: TaskId, pin: PinId) -> Self {
        self.pins.insert(task, pin);
        self
    }

    /// Pin pulsed by [`on_idle`](InstrumentationHook::on_idle).
    pub fn with_idle_pin(mut self, pin: PinId) -> Self {
        self.idle_pin = Some(pin);
        self
    }
}

impl InstrumentationHook for GpioProbe {
    fn on_enter(&self, task: TaskId) {
        if let Some(&pin) = self.pins.get(&task) {
            self.output.write(pin, Level::High);
        }
    }

    fn on_exit(&self, task: TaskId) {
        if let Some(&pin) = self.pins.get(&task) {
            self.output.write(pin, Level::Low);
        }
    }

    fn on_idle(&self) {
        if let Some(pin) = self.idle_pin {
            self.output.write(pin, Level::High);
            self.output.write(pin, Level::Low);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
