//! Diff engine
//!
//! Compares a source-derived payload with the destination's detail
//! representation. Assignment lists are compared as sorted id lists; the
//! destination side may hold nested objects, which are reduced to their `id`.

use nbmig_model::{AssignmentField, ConfigContextPayload};
use serde_json::Value;

/// Fields that differ between payload and destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDiff {
    changed: Vec<&'static str>,
}

impl ContextDiff {
    /// Whether a write is needed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Names of the differing fields
    #[inline]
    #[must_use]
    pub fn changed(&self) -> &[&'static str] {
        &self.changed
    }
}

impl std::fmt::Display for ContextDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.changed.join(", "))
    }
}

/// Reduce a destination assignment list to ids
///
/// Nested objects contribute their `id`, bare integers pass through. Returns
/// `None` if any element carries no usable id, which can never equal a
/// resolved payload list.
#[must_use]
pub fn normalize_ids(items: Option<&Value>) -> Option<Vec<i64>> {
    match items {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => map.get("id").and_then(Value::as_i64),
                other => other.as_i64(),
            })
            .collect(),
        Some(_) => None,
    }
}

fn sorted(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids
}

/// Compare payload against the destination detail representation
#[must_use]
pub fn diff_context(payload: &ConfigContextPayload, existing: &Value) -> ContextDiff {
    let field = |key: &str| existing.get(key).unwrap_or(&Value::Null);
    let mut changed = Vec::new();

    if *field("weight") != Value::from(payload.weight) {
        changed.push("weight");
    }
    if *field("data") != payload.data {
        changed.push("data");
    }
    if *field("is_active") != Value::Bool(payload.is_active) {
        changed.push("is_active");
    }
    if *field("description") != Value::String(payload.description.clone()) {
        changed.push("description");
    }

    for assignment in AssignmentField::ALL {
        let wanted = sorted(payload.assignments.get(assignment));
        let current = normalize_ids(existing.get(assignment.as_str())).map(|mut ids| {
            ids.sort_unstable();
            ids
        });
        if current.as_ref() != Some(&wanted) {
            changed.push(assignment.as_str());
        }
    }

    ContextDiff { changed }
}

/// Whether the destination object must be written
#[inline]
#[must_use]
pub fn needs_update(payload: &ConfigContextPayload, existing: &Value) -> bool {
    !diff_context(payload, existing).is_empty()
}
