/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-task response-time measurement and deadline-miss counting.
//!
//! Each task owns exactly one [`DeadlineMonitor`] slot.  A release brackets
//! its body with [`begin`](DeadlineMonitor::begin) and
//! [`end`](DeadlineMonitor::end); if the measured window `end − start` is
//! **strictly** greater than the task's deadline the slot's miss counter is
//! incremented.  The suspension before the next release is outside the
//! window.
//!
//! Slots are plain atomics: the owning task is the only writer, while the
//! counters stay readable at any time from any thread (the miss report).
//! Counters saturate at `u32::MAX` and are never reset.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tracing::warn;

use crate::clock::Tick;
use crate::task::{TaskId, TaskSpec};

// ── Slot ──────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Slot {
    name: String,
    deadline: Tick,
    start: AtomicU64,
    last_window: AtomicU64,
    worst_window: AtomicU64,
    misses: AtomicU32,
}

impl Slot {
    fn new(name: &str, deadline: Tick) -> Self {
        Self {
            name: name.to_owned(),
            deadline,
            start: AtomicU64::new(0),
            last_window: AtomicU64::new(0),
            worst_window: AtomicU64::new(0),
            misses: AtomicU32::new(0),
        }
    }
}

// ── DeadlineMonitor ───────────────────────────────────────────────────────────

/// One measurement slot per task, indexed by [`TaskId`].
#[derive(Debug)]
pub struct DeadlineMonitor {
    slots: Vec<Slot>,
}

impl DeadlineMonitor {
    /// Create one slot per spec, in order; slot `i` belongs to `TaskId(i)`.
    pub fn for_tasks(specs: &[TaskSpec]) -> Self {
        Self {
            slots: specs.iter().map(|s| Slot::new(&s.name, s.deadline)).collect(),
        }
    }

    /// Record `now` as the start of `task`'s measurement window.
    pub fn begin(&self, task: TaskId, now: Tick) {
        if let Some(slot) = self.slot(task) {
            slot.start.store(now, Ordering::Relaxed);
        }
    }

    /// Close `task`'s window at `now`.
    ///
    /// Returns `true` (and bumps the miss counter) when the window exceeded
    /// the deadline.
    pub fn end(&self, task: TaskId, now: Tick) -> bool {
        let Some(slot) = self.slot(task) else {
            return false;
        };

        let window = now.saturating_sub(slot.start.load(Ordering::Relaxed));
        slot.last_window.store(window, Ordering::Relaxed);
        slot.worst_window.fetch_max(window, Ordering::Relaxed);

        if window <= slot.deadline {
            return false;
        }

        let previous = slot
            .misses
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |m| {
                Some(m.saturating_add(1))
            })
            .unwrap_or(u32::MAX);
        warn!(
            task = %slot.name,
            window,
            deadline = slot.deadline,
            misses = previous.saturating_add(1),
            "deadline miss"
        );
        true
    }

    /// Miss count for `task` (0 for an unknown id).
    pub fn misses(&self, task: TaskId) -> u32 {
        self.slot(task)
            .map_or(0, |s| s.misses.load(Ordering::Relaxed))
    }

    /// Deadline the slot for `task` checks against.
    pub fn deadline(&self, task: TaskId) -> Option<Tick> {
        self.slot(task).map(|s| s.deadline)
    }

    /// Most recent window measured for `task`.
    pub fn last_window(&self, task: TaskId) -> Option<Tick> {
        self.slot(task)
            .map(|s| s.last_window.load(Ordering::Relaxed))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the monitor has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Point-in-time copy of every slot's counters.
    pub fn snapshot(&self) -> MissReport {
        MissReport {
            entries: self
                .slots
                .iter()
                .map(|s| MissEntry {
                    task: s.name.clone(),
                    deadline: s.deadline,
                    misses: s.misses.load(Ordering::Relaxed),
                    worst_window: s.worst_window.load(Ordering::Relaxed),
                })
                .collect(),
        }
    }

    fn slot(&self, task: TaskId) -> Option<&Slot> {
        self.slots.get(task.index())
    }
}

// ── MissReport ────────────────────────────────────────────────────────────────

/// Exported miss counters of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissEntry {
    pub task: String,
    pub deadline: Tick,
    pub misses: u32,
    /// Longest window observed so far, in ticks.
    pub worst_window: Tick,
}

/// Snapshot of all miss counters, in task order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissReport {
    pub entries: Vec<MissEntry>,
}

impl MissReport {
    /// Sum of all miss counters.
    pub fn total_misses(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.misses)).sum()
    }

    /// Look up one task's entry by name.
    pub fn get(&self, task: &str) -> Option<&MissEntry> {
        self.entries.iter().find(|e| e.task == task)
    }
}

impl fmt::Display for MissReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20} {:>8} {:>8} {:>8}", "task", "deadline", "worst", "misses")?;
        for e in &self.entries {
            writeln!(
                f,
                "{:<20} {:>8} {:>8} {:>8}",
                e.task, e.deadline, e.worst_window, e.misses
            )?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> DeadlineMonitor {
        DeadlineMonitor::for_tasks(&[
            TaskSpec::new("fast", 20, 2),
            TaskSpec::new("slow", 100, 2),
        ])
    }

    const FAST: TaskId = TaskId::new(0);
    const SLOW: TaskId = TaskId::new(1);

    #[test]
    fn unknown_task_reads_as_empty_and_is_never_counted() {
        let m = monitor();
        let unknown = TaskId::new(9);
        m.begin(unknown, 0);
        assert!(!m.end(unknown, 1_000));
        assert_eq!(m.misses(unknown), 0);
        assert_eq!(m.deadline(unknown), None);
        assert_eq!(m.last_window(unknown), None);
        assert_eq!(m.snapshot().total_misses(), 0);
    }

    #[test]
    fn window_within_deadline_is_not_a_miss() {
        let m = monitor();
        m.begin(FAST, 100);
        assert!(!m.end(FAST, 110));
        assert_eq!(m.misses(FAST), 0);
        assert_eq!(m.last_window(FAST), Some(10));
    }

    #[test]
    fn window_equal_to_deadline_is_not_a_miss() {
        let m = monitor();
        m.begin(FAST, 0);
        assert!(!m.end(FAST, 20));
        assert_eq!(m.misses(FAST), 0);
    }

    #[test]
    fn window_strictly_over_deadline_is_a_miss() {
        let m = monitor();
        m.begin(FAST, 0);
        assert!(m.end(FAST, 21));
        assert_eq!(m.misses(FAST), 1);
    }

    #[test]
    fn slots_are_independent() {
        let m = monitor();
        m.begin(FAST, 0);
        m.begin(SLOW, 0);
        m.end(FAST, 50);
        m.end(SLOW, 50);
        assert_eq!(m.misses(FAST), 1);
        assert_eq!(m.misses(SLOW), 0);
    }

    #[test]
    fn counter_is_monotonic_across_releases() {
        let m = monitor();
        let mut last = 0;
        for (i, window) in [25u64, 5, 30, 0, 21].into_iter().enumerate() {
            let start = i as u64 * 100;
            m.begin(FAST, start);
            m.end(FAST, start + window);
            let now = m.misses(FAST);
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn counter_saturates() {
        let m = monitor();
        m.slots[0].misses.store(u32::MAX, Ordering::Relaxed);
        m.begin(FAST, 0);
        assert!(m.end(FAST, 1_000));
        assert_eq!(m.misses(FAST), u32::MAX);
    }

    #[test]
    fn snapshot_reports_every_slot_in_order() {
        let m = monitor();
        m.begin(SLOW, 0);
        m.end(SLOW, 130);
        m.begin(SLOW, 200);
        m.end(SLOW, 240);

        let report = m.snapshot();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].task, "fast");
        let slow = report.get("slow").unwrap();
        assert_eq!(slow.deadline, 100);
        assert_eq!(slow.misses, 1);
        assert_eq!(slow.worst_window, 130);
        assert_eq!(report.total_misses(), 1);
    }

    #[test]
    fn report_renders_one_row_per_task() {
        let text = monitor().snapshot().to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("slow"));
    }
}
