//! Per-status SLA policies.
//!
//! A policy names the timestamp staleness is measured from and two
//! thresholds in hours. Only `slow` drives the deadline today; `fast` is
//! parsed and validated so the configuration stays honest, but no branch
//! consumes it yet.

use crate::error::{QueueCheckError, Result};
use crate::types::ActivityAttribute;
use chrono::Duration;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// PolicyEntry
// ---------------------------------------------------------------------------

/// `fast <= slow` is expected but not enforced here; `Config::validate`
/// reports a warning when it does not hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyEntry {
    pub activity: ActivityAttribute,
    pub fast_hours: f64,
    pub slow_hours: f64,
}

impl PolicyEntry {
    pub fn new(activity: ActivityAttribute, fast_hours: f64, slow_hours: f64) -> Self {
        Self {
            activity,
            fast_hours,
            slow_hours,
        }
    }

    pub fn fast(&self) -> Option<Duration> {
        hours(self.fast_hours)
    }

    pub fn slow(&self) -> Option<Duration> {
        hours(self.slow_hours)
    }
}

/// Upper bound on a threshold, roughly a century.
pub const MAX_HOURS: f64 = 876_600.0;

fn hours(h: f64) -> Option<Duration> {
    if !h.is_finite() {
        return None;
    }
    Duration::try_milliseconds((h * 3_600_000.0).round() as i64)
}

// ---------------------------------------------------------------------------
// StatusPolicyTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusPolicyTable {
    entries: BTreeMap<String, Option<PolicyEntry>>,
}

impl StatusPolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy (or an explicit "no policy") for a status.
    pub fn insert(&mut self, status: &str, policy: Option<PolicyEntry>) {
        self.entries.insert(status.to_lowercase(), policy);
    }

    /// Build the table from the raw `states:` section of the config.
    ///
    /// `null`, `false` and mappings with other than exactly one key mean
    /// "no policy". A single-key mapping must name `created` or `updated`
    /// and carry numeric `fast` and `slow` values.
    pub fn from_raw(raw: &BTreeMap<String, Option<Value>>) -> Result<Self> {
        let mut table = Self::new();
        for (status, value) in raw {
            let policy = match value {
                None | Some(Value::Null) | Some(Value::Bool(false)) => None,
                Some(Value::Mapping(map)) if map.len() != 1 => {
                    info!(
                        status = %status,
                        keys = map.len(),
                        "policy is not a single-key mapping; treating as no policy"
                    );
                    None
                }
                Some(Value::Mapping(map)) => Some(parse_entry(status, map)?),
                Some(other) => {
                    return Err(invalid(
                        status,
                        format!("expected a mapping or null, got {}", describe(other)),
                    ))
                }
            };
            debug!(status = %status, ?policy, "loaded policy");
            table.insert(status, policy);
        }
        Ok(table)
    }

    /// Resolve the policy for a ticket status, case-insensitively.
    pub fn resolve(&self, status: &str) -> Option<&PolicyEntry> {
        self.entries
            .get(&status.to_lowercase())
            .and_then(|p| p.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&PolicyEntry>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

fn parse_entry(status: &str, map: &Mapping) -> Result<PolicyEntry> {
    let (key, speeds) = map
        .iter()
        .next()
        .ok_or_else(|| invalid(status, "empty mapping".to_string()))?;
    let activity: ActivityAttribute = key
        .as_str()
        .ok_or_else(|| invalid(status, "activity attribute must be a string".to_string()))?
        .parse()
        .map_err(|reason| invalid(status, reason))?;
    let speeds = speeds.as_mapping().ok_or_else(|| {
        invalid(
            status,
            format!("'{activity}' must map to fast and slow hours"),
        )
    })?;
    let fast_hours = threshold(status, speeds, "fast")?;
    let slow_hours = threshold(status, speeds, "slow")?;
    Ok(PolicyEntry::new(activity, fast_hours, slow_hours))
}

fn threshold(status: &str, speeds: &Mapping, key: &str) -> Result<f64> {
    let value = speeds
        .get(key)
        .ok_or_else(|| invalid(status, format!("missing '{key}' threshold")))?;
    let hours = value
        .as_f64()
        .ok_or_else(|| invalid(status, format!("'{key}' must be a number of hours")))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid(
            status,
            format!("'{key}' must be a non-negative number of hours"),
        ));
    }
    if hours > MAX_HOURS {
        return Err(invalid(
            status,
            format!("'{key}' must not exceed {MAX_HOURS} hours"),
        ));
    }
    Ok(hours)
}

fn invalid(status: &str, reason: String) -> QueueCheckError {
    QueueCheckError::InvalidPolicy {
        status: status.to_string(),
        reason,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
