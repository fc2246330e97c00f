//! Fixed-step tick harness for deterministic, snapshot-style tests.
//!
//! Steps a small simulation a fixed number of ticks and captures selected
//! state after each one. The report can be compared directly (two seeded runs
//! must agree) or against a golden JSON file on disk.

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use stormrunner_core::{SimTick, TICK_SECONDS};

/// Configuration for a harness run.
#[derive(Debug, Clone)]
pub struct TickHarnessConfig {
    /// Human-readable name (written into the report).
    pub name: String,
    /// Number of ticks to step (report includes the initial frame at tick 0).
    pub ticks: u64,
    /// Seconds per tick.
    pub dt: f32,
}

impl TickHarnessConfig {
    /// `ticks` steps at the default tick rate.
    pub fn new(name: impl Into<String>, ticks: u64) -> Self {
        Self {
            name: name.into(),
            ticks,
            dt: TICK_SECONDS,
        }
    }
}

/// Single frame captured at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Captured payload.
    pub snapshot: S,
}

/// Every frame of one harness run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport<S> {
    /// Run name.
    pub name: String,
    /// Frames, starting at tick 0.
    pub frames: Vec<TickFrame<S>>,
}

/// Run the harness and return the report.
///
/// Captures the initial frame at tick 0, then steps `config.ticks` times,
/// capturing after each step (so the report contains `ticks + 1` frames).
/// `step` receives the tick being simulated and the step length.
pub fn run_ticks<State, Snapshot, StepFn, SnapFn>(
    config: &TickHarnessConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> TickReport<Snapshot>
where
    StepFn: FnMut(SimTick, f32, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(config.ticks as usize + 1);

    let mut tick = SimTick::ZERO;
    frames.push(TickFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..config.ticks {
        step(tick, config.dt, &mut state);
        tick = tick.advance(1);
        frames.push(TickFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    TickReport {
        name: config.name.clone(),
        frames,
    }
}

/// Run the harness and assert (or update) the golden file at `path`.
pub fn assert_tick_snapshot<P, State, Snapshot, StepFn, SnapFn>(
    path: P,
    config: &TickHarnessConfig,
    state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    P: AsRef<Path>,
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, f32, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let report = run_ticks(config, state, step, snapshot);
    assert_json_snapshot(path, &report)
}
