/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Concrete task bodies.
//!
//! | Body | Channel role | Per release |
//! |---|---|---|
//! | [`EdgeMonitor`] | producer | sample one input, send on level change |
//! | [`Announcer`] | producer | send a fixed message |
//! | [`DrainToSink`] | sole consumer | receive until empty, write each payload |
//! | [`SyntheticLoad`] | – | run a [`SyntheticWorkload`] |

pub mod announcer;
pub mod drain;
pub mod edge;
pub mod load;

pub use announcer::Announcer;
pub use drain::DrainToSink;
pub use edge::{Edge, EdgeMonitor};
pub use load::{BusyLoop, SimulatedCost, SpinFor, SyntheticLoad, SyntheticWorkload};
