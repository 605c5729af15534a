/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rt-taskset – periodic task set with bounded message passing and
//! deadline monitoring
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── clock/       – tick sources (virtual and tokio wall clock)
//! ├── task/        – task descriptors, bodies, drift-free periodic release
//! ├── channel/     – bounded MPSC message channel
//! ├── monitor/     – per-task response-time windows and miss counters
//! ├── probe/       – entry/exit/idle instrumentation hook
//! ├── io/          – digital pins and output sinks
//! ├── bodies/      – edge monitor, announcer, drain, synthetic loads
//! ├── config/      – YAML task-set configuration
//! ├── analysis/    – hyperperiod and utilisation diagnostics
//! ├── system/      – shared context and task-set startup
//! ├── runtime/     – tokio wall-clock runner
//! └── sim/         – deterministic virtual-tick runner
//! ```

pub mod analysis;
pub mod bodies;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod io;
pub mod monitor;
pub mod probe;
pub mod runtime;
pub mod sim;
pub mod system;
pub mod task;
