//! Local context transfer
//!
//! Each entry is located on the destination by `name`; when that fails the
//! configured [`IdFallback`] policy decides whether the source id may be used
//! directly. The object is then patched with `local_context_data` only.

use crate::summary::LocalContextSummary;
use nbmig_client::{detail_url, NetboxApi};
use nbmig_model::{LocalContextEntry, LocalOutcome, ObjectKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// What to do when no destination object matches an entry's name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdFallback {
    /// Try the destination at the source id, see [`same_id_fallback`]
    #[default]
    SameId,
    /// Give up on the entry
    Refuse,
}

/// Fetch `<kind endpoint>/<id>/` on the destination
///
/// Only correct when source and destination happen to share ids for this
/// object. Returns the detail URL if that request answers 2xx.
pub async fn same_id_fallback(api: &dyn NetboxApi, kind: ObjectKind, id: i64) -> Option<String> {
    let url = detail_url(api.base_url(), kind.endpoint(), id);
    match api.get_json(&url, &[]).await {
        Ok(_) => {
            tracing::warn!("Using id fallback for {} {}: {}", kind, id, url);
            Some(url)
        }
        Err(e) => {
            tracing::debug!("Id fallback lookup of {} failed: {}", url, e);
            None
        }
    }
}

/// Applies local context entries to one destination
pub struct LocalContextReconciler<'a> {
    api: &'a dyn NetboxApi,
    fallback: IdFallback,
}

impl<'a> LocalContextReconciler<'a> {
    /// Create reconciler writing to `api`
    #[must_use]
    pub fn new(api: &'a dyn NetboxApi, fallback: IdFallback) -> Self {
        Self { api, fallback }
    }

    /// Apply every entry in order
    pub async fn apply_all(&self, entries: &[LocalContextEntry]) -> LocalContextSummary {
        let mut summary = LocalContextSummary::default();
        for entry in entries {
            summary.record(self.apply(entry).await);
        }
        summary
    }

    /// Locate and patch one entry
    pub async fn apply(&self, entry: &LocalContextEntry) -> LocalOutcome {
        tracing::info!(
            "Applying context to {} '{}' (ID {})",
            entry.kind,
            entry.name,
            entry.id
        );

        let Some(url) = self.locate(entry).await else {
            tracing::error!(
                "{} '{}' (ID {}) not found on destination",
                entry.kind,
                entry.name,
                entry.id
            );
            return LocalOutcome::NotFound;
        };

        let body = json!({"local_context_data": entry.local_context_data});
        match self.api.patch_json(&url, body).await {
            Ok(_) => LocalOutcome::Applied,
            Err(e) => {
                tracing::error!("PATCH failed for {}: {}", url, e);
                LocalOutcome::Failed
            }
        }
    }

    /// Detail URL of the destination object for an entry
    pub async fn locate(&self, entry: &LocalContextEntry) -> Option<String> {
        let collection = self.api.collection_url(entry.kind.endpoint());
        match self.api.find_first(&collection, &[("name", entry.name.as_str())]).await {
            Ok(Some(found)) => {
                if let Some(url) = found.get("url").and_then(Value::as_str) {
                    return Some(url.to_string());
                }
                if let Some(id) = found.get("id").and_then(Value::as_i64) {
                    return Some(detail_url(self.api.base_url(), entry.kind.endpoint(), id));
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Name lookup of {} '{}' failed: {}", entry.kind, entry.name, e);
            }
        }

        match self.fallback {
            IdFallback::SameId => same_id_fallback(self.api, entry.kind, entry.id).await,
            IdFallback::Refuse => None,
        }
    }
}

impl std::fmt::Debug for LocalContextReconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalContextReconciler")
            .field("destination", &self.api.base_url())
            .field("fallback", &self.fallback)
            .finish()
    }
}
