#![warn(missing_docs)]
//! Deterministic testing surfaces (event stream, snapshots, scripted randomness).

mod scripted;
mod snapshot;
mod tick_harness;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use stormrunner_core::SimTick;
use tracing::debug;

pub use scripted::*;
pub use snapshot::*;
pub use tick_harness::*;

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Human-readable kind label (`weather_changed`, `lightning`, `command`, ...).
    pub kind: &'a str,
    /// Structured payload.
    pub payload: Value,
}

impl<'a> EventRecord<'a> {
    /// Build a record, serializing `payload` to JSON.
    pub fn new<T: Serialize>(tick: SimTick, kind: &'a str, payload: &T) -> Result<Self> {
        let payload = serde_json::to_value(payload)
            .with_context(|| format!("Failed to serialize {kind} payload"))?;
        Ok(Self {
            tick,
            kind,
            payload,
        })
    }
}

/// A sink that writes newline-delimited JSON.
pub struct JsonlSink<W: Write = BufWriter<File>> {
    out: W,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        debug!(path = %path.display(), "event log opened");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    /// Wrap an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
