/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured startup errors.
//!
//! Every variant describes a resource or parameter problem detected while
//! the task set is being assembled.  None of them is recoverable: the binary
//! reports the error and exits before the first release, so the scheduler
//! never starts with a partially created task set.
//!
//! Runtime conditions (full channel, empty channel, deadline miss) are **not**
//! errors and never appear here; they are dropped or counted where they
//! happen.

use thiserror::Error;

use crate::analysis::HyperperiodError;

/// Fatal error raised while building the task set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// The configuration contains no tasks at all.
    #[error("no tasks configured")]
    NoTasks,

    /// A task was declared with `period == 0`.
    #[error("task '{task}' has a zero period")]
    ZeroPeriod { task: String },

    /// A task was declared with an explicit `deadline == 0`.
    #[error("task '{task}' has a zero deadline")]
    ZeroDeadline { task: String },

    /// Two tasks share the same name; names identify miss counters.
    #[error("duplicate task name '{0}'")]
    DuplicateTask(String),

    /// The channel must hold at least one message.
    #[error("channel capacity must be greater than zero")]
    ZeroCapacity,

    /// The channel's backing storage could not be reserved.
    #[error("cannot allocate channel storage for {capacity} message(s)")]
    ChannelAllocation { capacity: usize },

    /// The channel supports exactly one consumer.
    #[error("more than one drain task configured: '{first}' and '{second}'")]
    MultipleConsumers { first: String, second: String },

    /// A tick must correspond to a non-zero amount of wall-clock time.
    #[error("tick quantum must be greater than zero")]
    ZeroTickQuantum,

    /// The task set's periods have no representable hyperperiod.
    #[error("hyperperiod: {0}")]
    Hyperperiod(#[from] HyperperiodError),
}
