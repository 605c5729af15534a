/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Edge-detecting input monitor.
//!
//! The first sample is taken in `on_start`; afterwards every release samples
//! once and compares against the remembered level.  Only a change produces a
//! message (`"Rising Edge <label>\n"` / `"Falling Edge <label>\n"`), so a
//! stable input generates no channel traffic at all.

use std::sync::Arc;

use tracing::debug;

use crate::channel::Message;
use crate::io::{DigitalInput, Level, PinId};
use crate::task::{Activation, TaskBody};

/// Direction of an observed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Transition from `previous` to `current`, if any.
    pub fn between(previous: Level, current: Level) -> Option<Self> {
        match (previous, current) {
            (Level::Low, Level::High) => Some(Edge::Rising),
            (Level::High, Level::Low) => Some(Edge::Falling),
            _ => None,
        }
    }
}

/// Watches one digital input for level changes.
pub struct EdgeMonitor {
    input: Arc<dyn DigitalInput>,
    pin: PinId,
    rising_text: String,
    falling_text: String,
    previous: Level,
}

impl EdgeMonitor {
    /// Monitor `pin`; messages name the input as `label`.
    pub fn new(input: Arc<dyn DigitalInput>, pin: PinId, label: &str) -> Self {
        Self {
            input,
            pin,
            rising_text: format!("Rising Edge {label}\n"),
            falling_text: format!("Falling Edge {label}\n"),
            previous: Level::Low,
        }
    }

    /// Last level the monitor accepted.
    pub fn previous(&self) -> Level {
        self.previous
    }
}

impl TaskBody for EdgeMonitor {
    fn on_start(&mut self, _act: &Activation<'_>) {
        self.previous = self.input.read(self.pin);
    }

    fn run(&mut self, act: &Activation<'_>) {
        let current = self.input.read(self.pin);
        let Some(edge) = Edge::between(self.previous, current) else {
            return;
        };
        self.previous = current;

        let text = match edge {
            Edge::Rising => &self.rising_text,
            Edge::Falling => &self.falling_text,
        };
        debug!(pin = %self.pin, ?edge, "edge detected");
        // A full channel drops the message; that is the overload policy.
        act.system
            .channel
            .try_send(Message::new(act.task, act.now(), text));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
