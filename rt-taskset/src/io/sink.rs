/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Text output sink (the serial port of the target board).
//!
//! A write is assumed to take the whole buffer before returning; there is no
//! partial-write handling.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for drained message payloads.
pub trait OutputSink: Send {
    /// Write all of `bytes`.
    fn write_text(&mut self, bytes: &[u8]) -> io::Result<()>;
}

// ── WriterSink ────────────────────────────────────────────────────────────────

/// Adapts any [`io::Write`] (stdout, a serial device file, …).
#[derive(Debug)]
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl WriterSink<io::Stdout> {
    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> OutputSink for WriterSink<W> {
    fn write_text(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// Records every write as one entry.  Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, in order.
    pub fn writes(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of writes so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl OutputSink for MemorySink {
    fn write_text(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.lock().push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
