/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tick clock abstraction.
//!
//! All timing in the task set is expressed in ticks, one tick per fixed time
//! quantum.  Two clocks implement [`TickClock`]:
//!
//! * [`ManualClock`]: a shared counter moved explicitly by the simulator or
//!   by a [`SimulatedCost`](crate::bodies::SimulatedCost) workload.  Fully
//!   deterministic; used by tests and `--simulate`.
//! * [`MonotonicClock`]: derived from `tokio::time::Instant`, so it also
//!   follows tokio's paused clock in `start_paused` tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::SetupError;

/// Absolute time in ticks since the clock's origin.
pub type Tick = u64;

/// A monotonically increasing tick source.
pub trait TickClock: Send + Sync {
    /// Current absolute tick.  Never decreases between calls.
    fn now(&self) -> Tick;
}

// ── ManualClock ───────────────────────────────────────────────────────────────

/// Tick counter advanced explicitly by its owner.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock that reads `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `ticks`.
    pub fn advance(&self, ticks: Tick) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Jump to `tick`.  Requests to move backwards are ignored.
    pub fn set(&self, tick: Tick) {
        self.ticks.fetch_max(tick, Ordering::SeqCst);
    }
}

impl TickClock for ManualClock {
    fn now(&self) -> Tick {
        self.ticks.load(Ordering::SeqCst)
    }
}

// ── MonotonicClock ────────────────────────────────────────────────────────────

/// Wall-clock tick source with a fixed quantum.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
    quantum: Duration,
}

impl MonotonicClock {
    /// Start counting ticks of `quantum` length from now.
    ///
    /// # Errors
    /// [`SetupError::ZeroTickQuantum`] if `quantum` is zero.
    pub fn start(quantum: Duration) -> Result<Self, SetupError> {
        if quantum.is_zero() {
            return Err(SetupError::ZeroTickQuantum);
        }
        Ok(Self {
            origin: Instant::now(),
            quantum,
        })
    }

    /// Length of one tick.
    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    /// The instant at which `tick` begins.
    pub fn instant_of(&self, tick: Tick) -> Instant {
        let nanos = self.quantum.as_nanos().saturating_mul(u128::from(tick));
        let nanos = u64::try_from(nanos).unwrap_or(u64::MAX);
        self.origin + Duration::from_nanos(nanos)
    }

    /// Suspend the calling task until `tick` has been reached.
    ///
    /// Returns immediately when `tick` is already in the past, which is what
    /// produces back-to-back releases after an overrun.
    pub async fn wait_until(&self, tick: Tick) {
        tokio::time::sleep_until(self.instant_of(tick)).await;
    }
}

impl TickClock for MonotonicClock {
    fn now(&self) -> Tick {
        let elapsed = self.origin.elapsed().as_nanos();
        let ticks = elapsed / self.quantum.as_nanos();
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
