/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Bounded FIFO message channel shared by all producers and the one consumer.
//!
//! ```text
//!  EdgeMonitor ──┐
//!  EdgeMonitor ──┼──try_send──►  [ m0 | m1 | … | m9 ]  ──try_receive──►  DrainToSink
//!  Announcer   ──┘                 capacity 10, FIFO
//! ```
//!
//! # Semantics
//! * Neither operation blocks.  `try_send` on a full channel returns `false`
//!   and leaves the queue untouched; the message is lost.  `try_receive` on an
//!   empty channel returns `None`.
//! * Ordering is global arrival order across all producers, guaranteed by a
//!   single mutex around the queue.
//! * Payloads are **copied** at send time into an owned [`Message`], so a
//!   producer may reuse or drop its buffer as soon as `try_send` returns.
//!
//! The backing storage is reserved once in [`MessageChannel::new`]; sends
//! never grow it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::clock::Tick;
use crate::error::SetupError;
use crate::task::TaskId;

/// Default number of message slots.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;

// ── Message ───────────────────────────────────────────────────────────────────

/// One queued text record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Task that produced the message.
    pub origin: TaskId,
    /// Tick at which the message was enqueued.
    pub sent_at: Tick,
    /// Owned copy of the payload text.
    pub text: String,
}

impl Message {
    /// Build a message, copying `text`.
    pub fn new(origin: TaskId, sent_at: Tick, text: &str) -> Self {
        Self {
            origin,
            sent_at,
            text: text.to_owned(),
        }
    }
}

// ── MessageChannel ────────────────────────────────────────────────────────────

/// Fixed-capacity, multi-producer / single-consumer FIFO.
#[derive(Debug)]
pub struct MessageChannel {
    queue: Mutex<VecDeque<Message>>,
    capacity: usize,
    /// Sends rejected because the channel was full (diagnostic only).
    dropped: AtomicU64,
}

impl MessageChannel {
    /// Create a channel holding at most `capacity` messages.
    ///
    /// # Errors
    /// * [`SetupError::ZeroCapacity`] – `capacity == 0`.
    /// * [`SetupError::ChannelAllocation`] – the slots could not be reserved.
    pub fn new(capacity: usize) -> Result<Self, SetupError> {
        if capacity == 0 {
            return Err(SetupError::ZeroCapacity);
        }
        let mut queue = VecDeque::new();
        queue
            .try_reserve_exact(capacity)
            .map_err(|_| SetupError::ChannelAllocation { capacity })?;

        Ok(Self {
            queue: Mutex::new(queue),
            capacity,
            dropped: AtomicU64::new(0),
        })
    }

    /// Enqueue `msg` unless the channel is full.
    ///
    /// Returns `true` on success.  On a full channel the message is discarded,
    /// occupancy is unchanged, and `false` is returned immediately.
    pub fn try_send(&self, msg: Message) -> bool {
        let mut queue = self.lock();
        if queue.len() >= self.capacity {
            drop(queue);
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                origin = msg.origin.index(),
                sent_at = msg.sent_at,
                dropped_total = total,
                "channel full, message dropped"
            );
            return false;
        }
        queue.push_back(msg);
        true
    }

    /// Dequeue the oldest message, or `None` if nothing is pending.
    pub fn try_receive(&self) -> Option<Message> {
        self.lock().pop_front()
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no message is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of queued messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of sends rejected since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    // A panic while holding the lock cannot leave the deque half-updated, so a
    // poisoned mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
