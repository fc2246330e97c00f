//! Golden-file comparison for serialized simulation output.
//!
//! Snapshots are pretty JSON with object keys sorted at every depth, so a
//! golden file only changes when the captured values do. A missing golden is
//! recorded on first run; an existing one is only rewritten when
//! `STORMRUNNER_UPDATE_SNAPSHOTS=1` is set.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "STORMRUNNER_UPDATE_SNAPSHOTS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Verify,
    Update,
}

impl Mode {
    fn from_env() -> Self {
        match std::env::var(UPDATE_SNAPSHOTS_ENV) {
            Ok(v) if matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes") => {
                Mode::Update
            }
            _ => Mode::Verify,
        }
    }
}

/// Assert that `value` matches the JSON snapshot stored at `path`.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if Mode::from_env() == Mode::Update {
        return record(path, &actual);
    }
    let expected = match fs::read_to_string(path) {
        Ok(expected) => expected,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "recording new snapshot");
            return record(path, &actual);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read snapshot {}", path.display()))
        }
    };

    match first_difference(&expected, &actual) {
        None => Ok(()),
        Some(line) => anyhow::bail!(
            "Snapshot mismatch at {} line {line} (run with {UPDATE_SNAPSHOTS_ENV}=1 to update)",
            path.display(),
        ),
    }
}

/// Canonical (sorted-key, pretty) JSON text for `value`, newline-terminated.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut text =
        serde_json::to_string_pretty(&sorted(value)).context("Failed to format snapshot JSON")?;
    text.push('\n');
    Ok(text)
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            Value::Object(ordered.into_iter().collect::<Map<_, _>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// 1-based line of the first difference, if any.
fn first_difference(expected: &str, actual: &str) -> Option<usize> {
    if expected == actual {
        return None;
    }
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            _ => return Some(line),
        }
    }
}

fn record(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}
