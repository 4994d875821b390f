//! Local context data attached to devices and virtual machines

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of object that can carry local context data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    VirtualMachine,
    Device,
}

impl ObjectKind {
    /// Collection path relative to `<base>/api/`
    #[inline]
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::VirtualMachine => "virtualization/virtual-machines",
            Self::Device => "dcim/devices",
        }
    }

    /// Kinds collected from the source
    #[must_use]
    pub fn collected(include_devices: bool) -> Vec<Self> {
        if include_devices {
            vec![Self::VirtualMachine, Self::Device]
        } else {
            vec![Self::VirtualMachine]
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VirtualMachine => f.write_str("virtual_machine"),
            Self::Device => f.write_str("device"),
        }
    }
}

/// One object's local context data, as exported from the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalContextEntry {
    /// Object kind
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Source-instance id
    pub id: i64,
    /// Natural key used to find the object on the destination
    pub name: String,
    /// Document patched onto the destination object
    pub local_context_data: Value,
}

impl LocalContextEntry {
    /// Project a listing item onto an entry
    ///
    /// Returns `Ok(None)` when the object carries no local context data.
    pub fn from_listing(kind: ObjectKind, item: &Value) -> Result<Option<Self>, ModelError> {
        let data = item.get("local_context_data").unwrap_or(&Value::Null);
        if is_empty_document(data) {
            return Ok(None);
        }

        #[derive(Deserialize)]
        struct Identity {
            id: i64,
            name: String,
        }

        let identity: Identity = serde_json::from_value(item.clone())
            .map_err(|e| ModelError::malformed("local context object", e))?;

        Ok(Some(Self {
            kind,
            id: identity.id,
            name: identity.name,
            local_context_data: data.clone(),
        }))
    }
}

/// Whether a document counts as "no local context"
fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
