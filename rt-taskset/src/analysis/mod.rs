/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Start-up timing analysis of the task set.
//!
//! * **Hyperperiod** – LCM of all periods, the window after which the release
//!   pattern repeats.  Used as the default simulation length, capped at a
//!   limit.  Only `u64` overflow is an error; a hyperperiod above the limit
//!   is logged.
//! * **Utilisation** – `Σ cost / period` over tasks with an estimated cost,
//!   compared against the Liu & Layland bound.  Purely advisory: exceeding
//!   the bound is logged, never rejected, since the deadline monitor is what
//!   actually observes misses at run time.

pub mod feasibility;
pub mod math;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Tick;
use crate::task::TaskSpec;
use feasibility::{liu_layland_bound, utilisation};
use math::lcm_all;

/// Default cap on the simulation length: one hour of 1 ms ticks.
pub const DEFAULT_HYPERPERIOD_LIMIT: Tick = 3_600_000;

// ── Error type ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HyperperiodError {
    /// No task had a non-zero period.
    #[error("no tasks with a valid (non-zero) period")]
    NoValidPeriods,

    /// LCM calculation overflowed `u64`.
    #[error("LCM overflow computing lcm({a}, {b})")]
    Overflow { a: Tick, b: Tick },
}

// ── Analysis result ───────────────────────────────────────────────────────────

/// Timing summary of one task set.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSetAnalysis {
    /// LCM of all periods, in ticks.
    pub hyperperiod: Tick,

    /// Distinct periods, sorted.
    pub unique_periods: Vec<Tick>,

    /// Utilisation of the tasks whose cost is known; `None` if no cost is.
    pub utilisation: Option<f64>,

    /// Liu & Layland bound for the number of tasks with a known cost.
    pub bound: f64,

    /// Cap applied by [`simulation_length`](Self::simulation_length).
    pub limit: Tick,
}

impl TaskSetAnalysis {
    /// Returns `true` when utilisation is known and above the bound.
    pub fn exceeds_bound(&self) -> bool {
        self.utilisation.is_some_and(|u| u > self.bound)
    }

    /// Default run length of a simulation: one hyperperiod, capped at `limit`.
    pub fn simulation_length(&self) -> Tick {
        self.hyperperiod.min(self.limit)
    }
}

/// Analyse `tasks`, each paired with its estimated cost in ticks (if known).
///
/// # Errors
/// See [`HyperperiodError`].
pub fn analyse(
    tasks: &[(&TaskSpec, Option<Tick>)],
    limit: Tick,
) -> Result<TaskSetAnalysis, HyperperiodError> {
    let mut unique_periods: Vec<Tick> = tasks
        .iter()
        .map(|(spec, _)| spec.period)
        .filter(|&p| p > 0)
        .collect();
    if unique_periods.is_empty() {
        return Err(HyperperiodError::NoValidPeriods);
    }
    unique_periods.sort_unstable();
    unique_periods.dedup();

    let hyperperiod = lcm_all(&unique_periods)?;
    if hyperperiod > limit {
        warn!(hyperperiod, limit, "hyperperiod above limit, simulations stop at the limit");
    }

    let costed: Vec<(u64, u64)> = tasks
        .iter()
        .filter_map(|(spec, cost)| cost.map(|c| (c, spec.period)))
        .collect();
    let util = (!costed.is_empty()).then(|| utilisation(&costed));
    let bound = liu_layland_bound(costed.len());

    let analysis = TaskSetAnalysis {
        hyperperiod,
        unique_periods,
        utilisation: util,
        bound,
        limit,
    };

    info!(
        hyperperiod,
        task_count = tasks.len(),
        unique_periods = ?analysis.unique_periods,
        "task set analysed"
    );
    match analysis.utilisation {
        Some(u) if analysis.exceeds_bound() => warn!(
            utilisation = format!("{:.1}%", u * 100.0),
            bound = format!("{:.1}%", bound * 100.0),
            "utilisation above Liu & Layland bound, deadline misses are possible"
        ),
        Some(u) => debug!(utilisation = u, bound, "utilisation within Liu & Layland bound"),
        None => debug!("no task costs known, utilisation not checked"),
    }

    Ok(analysis)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
