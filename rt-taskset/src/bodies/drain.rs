/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The channel's sole consumer.
//!
//! Each release empties the channel completely, writing every payload to the
//! output sink as one write.  Backlog therefore never exceeds what producers
//! can enqueue during one drain period (bounded by the channel capacity).

use tracing::{trace, warn};

use crate::io::OutputSink;
use crate::task::{Activation, TaskBody};

/// Drains the channel into an [`OutputSink`].
pub struct DrainToSink {
    sink: Box<dyn OutputSink>,
    forwarded: u64,
}

impl DrainToSink {
    pub fn new(sink: Box<dyn OutputSink>) -> Self {
        Self { sink, forwarded: 0 }
    }

    /// Messages forwarded since start.
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }
}

impl TaskBody for DrainToSink {
    fn run(&mut self, act: &Activation<'_>) {
        let mut batch = 0u32;
        while let Some(msg) = act.system.channel.try_receive() {
            if let Err(e) = self.sink.write_text(msg.text.as_bytes()) {
                warn!(origin = msg.origin.index(), error = %e, "output write failed");
            }
            batch += 1;
        }
        self.forwarded += u64::from(batch);
        if batch > 0 {
            trace!(batch, release = act.release, "drained");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Message;
    use crate::clock::ManualClock;
    use crate::io::MemorySink;
    use crate::system::test_context;
    use crate::task::{TaskId, TaskSpec};

    #[test]
    fn drains_every_pending_message_in_one_release() {
        let clock = ManualClock::new();
        let ctx = test_context(&clock, &[TaskSpec::new("drain", 20, 2)]);
        for i in 0..7 {
            ctx.channel
                .try_send(Message::new(TaskId::new(0), 0, &format!("m{i}\n")));
        }
        let sink = MemorySink::new();
        let mut body = DrainToSink::new(Box::new(sink.clone()));
        let act = Activation { system: &ctx, task: TaskId::new(0), release: 0 };

        body.run(&act);

        assert!(ctx.channel.is_empty());
        assert_eq!(sink.len(), 7);
        assert_eq!(sink.writes()[0], "m0\n");
        assert_eq!(sink.writes()[6], "m6\n");
        assert_eq!(body.forwarded(), 7);
    }

    #[test]
    fn empty_channel_writes_nothing() {
        let clock = ManualClock::new();
        let ctx = test_context(&clock, &[TaskSpec::new("drain", 20, 2)]);
        let sink = MemorySink::new();
        let mut body = DrainToSink::new(Box::new(sink.clone()));
        body.run(&Activation { system: &ctx, task: TaskId::new(0), release: 0 });
        assert!(sink.is_empty());
    }
}
