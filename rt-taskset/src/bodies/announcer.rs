/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Heartbeat producer: one fixed message per release.

use crate::channel::Message;
use crate::task::{Activation, TaskBody};

/// Sends the same text on every release, regardless of any input.
#[derive(Debug, Clone)]
pub struct Announcer {
    text: String,
}

impl Announcer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TaskBody for Announcer {
    fn run(&mut self, act: &Activation<'_>) {
        act.system
            .channel
            .try_send(Message::new(act.task, act.now(), &self.text));
    }
}
