//! Assignment fields of a config context
//!
//! Each of the 13 fields scopes a config context to a set of other objects.
//! [`AssignmentField::strategy`] is the table telling the resolver where and
//! how each field is looked up on the destination.

use crate::reference::Reference;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Collection path of tags, relative to `<base>/api/`
pub const TAG_ENDPOINT: &str = "extras/tags";

/// Scoping field of a config context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentField {
    Regions,
    SiteGroups,
    Sites,
    Locations,
    DeviceTypes,
    Roles,
    Platforms,
    ClusterTypes,
    ClusterGroups,
    Clusters,
    TenantGroups,
    Tenants,
    Tags,
}

/// Filter key used to find an object on the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey {
    /// Match on `slug`
    Slug,
    /// Match on `name`
    Name,
}

impl LookupKey {
    /// Query parameter name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slug => "slug",
            Self::Name => "name",
        }
    }
}

/// How a field's references become destination ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Look every reference up on `endpoint` filtered by `key`
    Lookup {
        /// Collection path relative to `<base>/api/`
        endpoint: &'static str,
        /// Filter key
        key: LookupKey,
    },
    /// Integers pass through, nested objects are looked up by slug
    Tag,
}

impl AssignmentField {
    /// All fields in payload order
    pub const ALL: [Self; 13] = [
        Self::Regions,
        Self::SiteGroups,
        Self::Sites,
        Self::Locations,
        Self::DeviceTypes,
        Self::Roles,
        Self::Platforms,
        Self::ClusterTypes,
        Self::ClusterGroups,
        Self::Clusters,
        Self::TenantGroups,
        Self::Tenants,
        Self::Tags,
    ];

    /// Field name as it appears in API bodies
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regions => "regions",
            Self::SiteGroups => "site_groups",
            Self::Sites => "sites",
            Self::Locations => "locations",
            Self::DeviceTypes => "device_types",
            Self::Roles => "roles",
            Self::Platforms => "platforms",
            Self::ClusterTypes => "cluster_types",
            Self::ClusterGroups => "cluster_groups",
            Self::Clusters => "clusters",
            Self::TenantGroups => "tenant_groups",
            Self::Tenants => "tenants",
            Self::Tags => "tags",
        }
    }

    /// Resolution strategy for this field
    #[must_use]
    pub fn strategy(self) -> ResolveStrategy {
        use LookupKey::{Name, Slug};

        let (endpoint, key) = match self {
            Self::Regions => ("dcim/regions", Slug),
            Self::SiteGroups => ("dcim/site-groups", Slug),
            Self::Sites => ("dcim/sites", Slug),
            Self::Locations => ("dcim/locations", Slug),
            Self::DeviceTypes => ("dcim/device-types", Slug),
            Self::Roles => ("dcim/device-roles", Slug),
            Self::Platforms => ("dcim/platforms", Slug),
            Self::ClusterTypes => ("virtualization/cluster-types", Slug),
            Self::ClusterGroups => ("virtualization/cluster-groups", Slug),
            Self::Clusters => ("virtualization/clusters", Name),
            Self::TenantGroups => ("tenancy/tenant-groups", Slug),
            Self::Tenants => ("tenancy/tenants", Slug),
            Self::Tags => return ResolveStrategy::Tag,
        };
        ResolveStrategy::Lookup { endpoint, key }
    }
}

impl std::fmt::Display for AssignmentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-side assignment lists keyed by field
///
/// Every field is present; a field missing or null in the source record is
/// an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignments {
    fields: BTreeMap<AssignmentField, Vec<Reference>>,
}

impl Assignments {
    /// Create assignments with every field empty
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: AssignmentField::ALL
                .iter()
                .map(|field| (*field, Vec::new()))
                .collect(),
        }
    }

    /// Pick the 13 assignment fields out of a raw record
    #[must_use]
    pub fn from_map(raw: &Map<String, Value>) -> Self {
        let mut assignments = Self::new();
        for field in AssignmentField::ALL {
            let Some(Value::Array(items)) = raw.get(field.as_str()) else {
                continue;
            };
            let references = items
                .iter()
                .filter_map(|item| {
                    let reference = Reference::from_value(item);
                    if reference.is_none() {
                        tracing::warn!("Ignoring unusable {} entry: {}", field, item);
                    }
                    reference
                })
                .collect();
            assignments.fields.insert(field, references);
        }
        assignments
    }

    /// References of one field
    #[must_use]
    pub fn get(&self, field: AssignmentField) -> &[Reference] {
        self.fields.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Iterate fields in payload order
    pub fn iter(&self) -> impl Iterator<Item = (AssignmentField, &[Reference])> {
        self.fields.iter().map(|(field, refs)| (*field, refs.as_slice()))
    }

    /// Total number of references across all fields
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }
}

impl Default for Assignments {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for Assignments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&raw))
    }
}
