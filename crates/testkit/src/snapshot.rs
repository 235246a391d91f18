//! Canonical JSON comparison and golden files for determinism tests.
//!
//! Values are serialized as pretty JSON with object keys sorted, so two runs that
//! produce the same data compare equal regardless of map iteration order.
//!
//! Golden files are compared as-is; rerun with `OBJVOX_UPDATE_SNAPSHOTS=1` to
//! rewrite them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Environment variable that enables golden file updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "OBJVOX_UPDATE_SNAPSHOTS";

/// Serialize `value` to canonical pretty JSON (sorted object keys, trailing newline).
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let value = canonicalize_value(value);
    let mut s = serde_json::to_string_pretty(&value).context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

/// Assert that `value` matches the golden JSON stored at `path`.
///
/// With `OBJVOX_UPDATE_SNAPSHOTS=1` the file is (re)written instead.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        return write_snapshot(path, &actual);
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;
    compare_lines(&expected, &actual)
        .with_context(|| format!("Snapshot mismatch at {}", path.display()))
}

/// Fail with the first differing line when two values serialize differently.
pub fn assert_same_json<A: Serialize, B: Serialize>(left: &A, right: &B) -> Result<()> {
    compare_lines(&canonical_json(left)?, &canonical_json(right)?)
}

fn compare_lines(left: &str, right: &str) -> Result<()> {
    if left == right {
        return Ok(());
    }
    let (line, (l, r)) = left
        .lines()
        .zip(right.lines())
        .enumerate()
        .find(|(_, (l, r))| l != r)
        .unwrap_or((left.lines().count().min(right.lines().count()), ("<end>", "<end>")));
    anyhow::bail!("JSON mismatch at line {}: {l:?} != {r:?}", line + 1)
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn write_snapshot(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}
