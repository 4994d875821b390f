//! Config contexts and their destination write payload

use crate::assignment::{AssignmentField, Assignments};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Weight NetBox assigns when none is given
pub const DEFAULT_WEIGHT: i64 = 1000;

/// Config context as read from the source listing or a snapshot file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigContext {
    /// Natural key, unique within an instance
    pub name: String,
    /// Ordering hint
    #[serde(default)]
    pub weight: Option<i64>,
    /// Arbitrary JSON document
    #[serde(default)]
    pub data: Value,
    /// Whether the context is applied
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Scoping references, still in source terms
    #[serde(flatten)]
    pub assignments: Assignments,
}

impl ConfigContext {
    /// Parse one raw listing item
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        serde_json::from_value(value.clone())
            .map_err(|e| ModelError::malformed("config context", e))
    }
}

/// Destination ids per assignment field, produced by reference resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceMapping(BTreeMap<AssignmentField, Vec<i64>>);

impl ReferenceMapping {
    /// Create empty mapping
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolved ids of one field
    #[inline]
    pub fn insert(&mut self, field: AssignmentField, ids: Vec<i64>) {
        self.0.insert(field, ids);
    }

    /// Resolved ids of one field, empty when never resolved
    #[must_use]
    pub fn get(&self, field: AssignmentField) -> &[i64] {
        self.0.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Iterate resolved fields
    pub fn iter(&self) -> impl Iterator<Item = (AssignmentField, &[i64])> {
        self.0.iter().map(|(field, ids)| (*field, ids.as_slice()))
    }

    /// Number of fields present
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ensure all 13 fields are present, filling gaps with empty lists
    #[must_use]
    pub fn complete(mut self) -> Self {
        for field in AssignmentField::ALL {
            self.0.entry(field).or_default();
        }
        self
    }
}

impl FromIterator<(AssignmentField, Vec<i64>)> for ReferenceMapping {
    fn from_iter<I: IntoIterator<Item = (AssignmentField, Vec<i64>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Body sent to the destination on create and update
///
/// Carries every assignment field, so an update also clears assignments the
/// source no longer has.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigContextPayload {
    pub name: String,
    pub weight: i64,
    pub data: Value,
    pub is_active: bool,
    pub description: String,
    #[serde(flatten)]
    pub assignments: ReferenceMapping,
}

impl ConfigContextPayload {
    /// Build payload from a source context and its resolved references
    #[must_use]
    pub fn new(source: &ConfigContext, assignments: ReferenceMapping) -> Self {
        Self {
            name: source.name.clone(),
            weight: source.weight.unwrap_or(DEFAULT_WEIGHT),
            data: source.data.clone(),
            is_active: source.is_active.unwrap_or(true),
            description: source.description.clone().unwrap_or_default(),
            assignments: assignments.complete(),
        }
    }

    /// JSON body for the API
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
