//! Reference resolution
//!
//! Translates source-side references into destination ids, one lookup query
//! per reference. A reference that cannot be found is dropped with a warning;
//! it never aborts the rest of the resolution.

use moka::future::Cache;
use nbmig_client::NetboxApi;
use nbmig_model::{
    AssignmentField, Assignments, LookupKey, Reference, ReferenceMapping, ResolveStrategy,
    TAG_ENDPOINT,
};
use serde_json::Value;

/// Resolves assignment references against a destination instance
///
/// Successful lookups are memoised per `(field, term)` for the lifetime of
/// the resolver; failed lookups are retried on every use.
pub struct ReferenceResolver<'a> {
    api: &'a dyn NetboxApi,
    cache: Option<Cache<(AssignmentField, String), i64>>,
}

impl<'a> ReferenceResolver<'a> {
    /// Create resolver with a lookup cache of `cache_capacity` entries
    ///
    /// A capacity of zero disables caching.
    #[must_use]
    pub fn new(api: &'a dyn NetboxApi, cache_capacity: u64) -> Self {
        Self {
            api,
            cache: (cache_capacity > 0).then(|| Cache::new(cache_capacity)),
        }
    }

    /// Create resolver without caching
    #[must_use]
    pub fn uncached(api: &'a dyn NetboxApi) -> Self {
        Self::new(api, 0)
    }

    /// Resolve every non-empty field
    ///
    /// Fields that are empty in the input are absent from the mapping.
    pub async fn resolve(&self, assignments: &Assignments) -> ReferenceMapping {
        let mut mapping = ReferenceMapping::new();
        for (field, references) in assignments.iter() {
            if references.is_empty() {
                continue;
            }
            let ids = self.resolve_field(field, references).await;
            mapping.insert(field, ids);
        }
        mapping
    }

    /// Resolve the references of one field, in input order
    pub async fn resolve_field(&self, field: AssignmentField, references: &[Reference]) -> Vec<i64> {
        let mut ids = Vec::with_capacity(references.len());
        match field.strategy() {
            ResolveStrategy::Tag => {
                for reference in references {
                    match reference {
                        Reference::Id(id) => ids.push(*id),
                        _ => match reference.slug_term() {
                            Some(slug) => {
                                if let Some(id) =
                                    self.lookup(field, TAG_ENDPOINT, LookupKey::Slug, slug).await
                                {
                                    ids.push(id);
                                }
                            }
                            None => {
                                tracing::warn!("Tag {} has no slug, skipping", reference);
                            }
                        },
                    }
                }
            }
            ResolveStrategy::Lookup { endpoint, key } => {
                for reference in references {
                    let Some(term) = reference.lookup_term() else {
                        tracing::warn!("{} entry without slug, name or id, skipping", field);
                        continue;
                    };
                    if let Some(id) = self.lookup(field, endpoint, key, &term).await {
                        ids.push(id);
                    }
                }
            }
        }
        ids
    }

    async fn lookup(
        &self,
        field: AssignmentField,
        endpoint: &str,
        key: LookupKey,
        term: &str,
    ) -> Option<i64> {
        let cache_key = (field, term.to_string());
        if let Some(cache) = &self.cache {
            if let Some(id) = cache.get(&cache_key).await {
                return Some(id);
            }
        }

        let url = self.api.collection_url(endpoint);
        let found = match self.api.find_first(&url, &[(key.as_str(), term)]).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Lookup of {} '{}' failed: {}, skipping", field, term, e);
                return None;
            }
        };

        let Some(id) = found.as_ref().and_then(|o| o.get("id")).and_then(Value::as_i64) else {
            tracing::warn!("{} '{}' not found on destination, skipping", field, term);
            return None;
        };

        tracing::debug!("Resolved {} '{}' to id {}", field, term, id);
        if let Some(cache) = &self.cache {
            cache.insert(cache_key, id).await;
        }
        Some(id)
    }
}

impl std::fmt::Debug for ReferenceResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("base_url", &self.api.base_url())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
