/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Digital I/O primitives.
//!
//! Reads are instantaneous samples with no debouncing; writes are
//! fire-and-forget.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;
use tracing::trace;

// ── Level ─────────────────────────────────────────────────────────────────────

/// Binary signal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Low,
    High,
}

// ── PinId ─────────────────────────────────────────────────────────────────────

/// A `(port, pin)` pair, printed as `P<port>.<pin>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct PinId {
    pub port: u8,
    pub pin: u8,
}

impl PinId {
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}.{}", self.port, self.pin)
    }
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// Sample a digital input.
pub trait DigitalInput: Send + Sync {
    fn read(&self, pin: PinId) -> Level;
}

/// Drive a digital output.
pub trait DigitalOutput: Send + Sync {
    fn write(&self, pin: PinId, level: Level);
}

// ── SimulatedGpio ─────────────────────────────────────────────────────────────

/// In-memory pin bank used on hosts without real GPIO.
///
/// Unset pins read low.  Every write to a pin is counted so tests can check
/// that a probe toggled.
#[derive(Debug, Default)]
pub struct SimulatedGpio {
    state: Mutex<GpioState>,
}

#[derive(Debug, Default)]
struct GpioState {
    levels: BTreeMap<PinId, Level>,
    writes: BTreeMap<PinId, u64>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `pin` to `level` (an external stimulus).
    pub fn set(&self, pin: PinId, level: Level) {
        trace!(%pin, ?level, "stimulus");
        self.lock().levels.insert(pin, level);
    }

    /// Current level of `pin`.
    pub fn level(&self, pin: PinId) -> Level {
        self.lock().levels.get(&pin).copied().unwrap_or_default()
    }

    /// How many times [`DigitalOutput::write`] targeted `pin`.
    pub fn write_count(&self, pin: PinId) -> u64 {
        self.lock().writes.get(&pin).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, GpioState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DigitalInput for SimulatedGpio {
    fn read(&self, pin: PinId) -> Level {
        self.level(pin)
    }
}

impl DigitalOutput for SimulatedGpio {
    fn write(&self, pin: PinId, level: Level) {
        let mut state = self.lock();
        state.levels.insert(pin, level);
        *state.writes.entry(pin).or_insert(0) += 1;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
