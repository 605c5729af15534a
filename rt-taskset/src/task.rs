/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic task model.
//!
//! ```text
//!   release   r              r+T            r+2T
//!             |              |              |
//!   runs      [body]         [body.............][body]
//!             ^ start()                         ^ release r+2T already
//!                                                 passed: no wait
//! ```
//!
//! A [`PeriodicTask`] pairs a static [`TaskSpec`] with a [`TaskBody`] and the
//! absolute tick of its next release.  The release point only ever moves by
//! exactly one period, independently of when the body actually ran or how
//! long it took, so the long-run release rate never drifts.  If a body
//! overruns past its next release point, the following wait returns at once
//! and the task runs back-to-back until it has caught up.
//!
//! Waiting itself belongs to the runner ([`runtime`](crate::runtime) or
//! [`sim`](crate::sim)); this module only decides *when* the next release is.

use tracing::trace;

use crate::clock::{Tick, TickClock};
use crate::error::SetupError;
use crate::system::SystemContext;

// ── TaskId ────────────────────────────────────────────────────────────────────

/// Index of a task within its task set.  Also indexes the monitor slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(usize);

impl TaskId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

// ── TaskSpec ──────────────────────────────────────────────────────────────────

/// Static timing parameters of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Unique name; also labels the task's miss counter.
    pub name: String,

    /// Release period in ticks.  Must be non-zero.
    pub period: Tick,

    /// Fixed priority; higher values preempt lower ones.
    pub priority: u8,

    /// Relative deadline in ticks, equal to `period` unless overridden.
    pub deadline: Tick,
}

impl TaskSpec {
    /// Spec with an implicit deadline (`deadline == period`).
    pub fn new(name: impl Into<String>, period: Tick, priority: u8) -> Self {
        Self {
            name: name.into(),
            period,
            priority,
            deadline: period,
        }
    }

    pub fn with_deadline(mut self, deadline: Tick) -> Self {
        self.deadline = deadline;
        self
    }

    /// Reject specs that cannot be released periodically.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.period == 0 {
            return Err(SetupError::ZeroPeriod {
                task: self.name.clone(),
            });
        }
        if self.deadline == 0 {
            return Err(SetupError::ZeroDeadline {
                task: self.name.clone(),
            });
        }
        Ok(())
    }
}

// ── TaskBody ──────────────────────────────────────────────────────────────────

/// Everything a body may touch during one release.
#[derive(Clone, Copy)]
pub struct Activation<'a> {
    pub system: &'a SystemContext,
    pub task: TaskId,
    /// Scheduled release tick being served (not the actual start tick).
    pub release: Tick,
}

impl Activation<'_> {
    /// Current tick of the system clock.
    pub fn now(&self) -> Tick {
        self.system.clock.now()
    }
}

/// The work done on each release.
///
/// Bodies keep their own state between releases and run to completion; they
/// never wait.
pub trait TaskBody: Send {
    /// Called once before the first release.
    fn on_start(&mut self, _act: &Activation<'_>) {}

    /// Called once per release.
    fn run(&mut self, act: &Activation<'_>);
}

impl<F> TaskBody for F
where
    F: FnMut(&Activation<'_>) + Send,
{
    fn run(&mut self, act: &Activation<'_>) {
        self(act)
    }
}

// ── PeriodicTask ──────────────────────────────────────────────────────────────

/// A task instance: spec, body and release bookkeeping.
pub struct PeriodicTask {
    id: TaskId,
    spec: TaskSpec,
    body: Box<dyn TaskBody>,
    release_at: Tick,
    releases: u64,
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("id", &self.id)
            .field("spec", &self.spec)
            .field("release_at", &self.release_at)
            .field("releases", &self.releases)
            .finish_non_exhaustive()
    }
}

impl PeriodicTask {
    pub fn new(id: TaskId, spec: TaskSpec, body: Box<dyn TaskBody>) -> Self {
        Self {
            id,
            spec,
            body,
            release_at: 0,
            releases: 0,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    /// Absolute tick of the next release.
    pub fn next_release(&self) -> Tick {
        self.release_at
    }

    /// Number of completed releases.
    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Anchor the schedule at the current tick and run the body's start hook.
    ///
    /// The first release is due immediately.
    pub fn start(&mut self, system: &SystemContext) {
        self.release_at = system.clock.now();
        let act = self.activation(system);
        self.body.on_start(&act);
        trace!(task = %self.spec.name, first_release = self.release_at, "task started");
    }

    /// Serve the due release and move the release point one period ahead.
    ///
    /// Returns the release tick that was served.
    pub fn execute(&mut self, system: &SystemContext) -> Tick {
        let served = self.release_at;
        let act = self.activation(system);

        system.probe.on_enter(self.id);
        system.monitor.begin(self.id, system.clock.now());

        self.body.run(&act);

        system.monitor.end(self.id, system.clock.now());
        system.probe.on_exit(self.id);

        self.release_at = served.saturating_add(self.spec.period);
        self.releases += 1;
        trace!(
            task = %self.spec.name,
            release = served,
            next = self.release_at,
            "release done"
        );
        served
    }

    fn activation<'a>(&self, system: &'a SystemContext) -> Activation<'a> {
        Activation {
            system,
            task: self.id,
            release: self.release_at,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
