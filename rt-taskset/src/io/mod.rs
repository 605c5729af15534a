/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Boundary to the hardware services the task set consumes.
//!
//! * [`gpio`] – digital input sampling and output (trace probe) writes.
//! * [`sink`] – the text output the drain task forwards messages to.
//!
//! Both are traits so the task bodies run unchanged against the host
//! simulation types defined next to them.

pub mod gpio;
pub mod sink;

pub use gpio::{DigitalInput, DigitalOutput, Level, PinId, SimulatedGpio};
pub use sink::{MemorySink, OutputSink, WriterSink};
