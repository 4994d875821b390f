//! Config context create-or-update workflow
//!
//! # Workflow
//! 1. Find the destination object by exact `name`
//! 2. Build the payload and resolve its assignments to destination ids
//! 3. No match: POST to the collection, outcome `Created`
//! 4. Match: GET its detail, diff, PATCH only when different
//!    (`Updated`), otherwise `Skipped`
//!
//! Names are assumed unique on the destination; if several objects share a
//! name, the first listing result is used.

use crate::diff::diff_context;
use crate::resolver::ReferenceResolver;
use crate::summary::ConfigContextSummary;
use nbmig_client::{detail_url, ClientError, NetboxApi};
use nbmig_model::{ConfigContext, ConfigContextPayload, Outcome, CONFIG_CONTEXT_ENDPOINT};
use serde_json::Value;

/// Reconciles source config contexts into one destination
pub struct ConfigContextReconciler<'a> {
    api: &'a dyn NetboxApi,
    resolver: ReferenceResolver<'a>,
}

impl<'a> ConfigContextReconciler<'a> {
    /// Create reconciler writing to `api`
    #[must_use]
    pub fn new(api: &'a dyn NetboxApi, resolver: ReferenceResolver<'a>) -> Self {
        Self { api, resolver }
    }

    /// Reconcile every source record in order
    pub async fn reconcile_all(&self, sources: &[Value]) -> ConfigContextSummary {
        let mut summary = ConfigContextSummary::default();
        for source in sources {
            summary.record(self.create_or_update(source).await);
        }
        summary
    }

    /// Reconcile one raw source record
    pub async fn create_or_update(&self, source: &Value) -> Outcome {
        let ctx = match ConfigContext::from_value(source) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::error!("Skipping unreadable config context: {}", e);
                return Outcome::Error;
            }
        };
        self.reconcile(&ctx).await
    }

    /// Reconcile one parsed config context
    pub async fn reconcile(&self, ctx: &ConfigContext) -> Outcome {
        let existing = match self.find_by_name(&ctx.name).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::error!(
                    "Failed to query config contexts on destination for name '{}': {}",
                    ctx.name,
                    e
                );
                return Outcome::Error;
            }
        };

        let payload = self.build_payload(ctx).await;

        match existing {
            None => self.create(&payload).await,
            Some(existing) => self.update_if_changed(&payload, &existing).await,
        }
    }

    /// First destination config context with exactly this name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Value>, ClientError> {
        let url = self.api.collection_url(CONFIG_CONTEXT_ENDPOINT);
        self.api.find_first(&url, &[("name", name)]).await
    }

    /// Payload with assignments resolved to destination ids
    pub async fn build_payload(&self, ctx: &ConfigContext) -> ConfigContextPayload {
        let mapping = self.resolver.resolve(&ctx.assignments).await;
        tracing::debug!(
            "Resolved {} of {} references for '{}'",
            mapping.iter().map(|(_, ids)| ids.len()).sum::<usize>(),
            ctx.assignments.reference_count(),
            ctx.name
        );
        ConfigContextPayload::new(ctx, mapping)
    }

    async fn create(&self, payload: &ConfigContextPayload) -> Outcome {
        tracing::info!("Creating config context '{}'", payload.name);
        let url = self.api.collection_url(CONFIG_CONTEXT_ENDPOINT);
        let Some(body) = request_body(payload) else {
            return Outcome::Error;
        };
        match self.api.post_json(&url, body).await {
            Ok(_) => Outcome::Created,
            Err(e) => {
                log_write_failure("CREATE", payload, &e);
                Outcome::Error
            }
        }
    }

    async fn update_if_changed(&self, payload: &ConfigContextPayload, existing: &Value) -> Outcome {
        let Some(url) = self.detail_url_of(existing) else {
            tracing::error!(
                "Destination config context '{}' has neither url nor id",
                payload.name
            );
            return Outcome::Error;
        };

        let detail = match self.api.get_json(&url, &[]).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::error!(
                    "Failed to retrieve context '{}' from dest for comparison: {}",
                    payload.name,
                    e
                );
                return Outcome::Error;
            }
        };

        let diff = diff_context(payload, &detail);
        if diff.is_empty() {
            tracing::info!("No changes for config context '{}', skipping.", payload.name);
            return Outcome::Skipped;
        }

        tracing::info!("Updating config context '{}' ({})", payload.name, diff);
        let Some(body) = request_body(payload) else {
            return Outcome::Error;
        };
        match self.api.patch_json(&url, body).await {
            Ok(_) => Outcome::Updated,
            Err(e) => {
                log_write_failure("UPDATE", payload, &e);
                Outcome::Error
            }
        }
    }

    fn detail_url_of(&self, existing: &Value) -> Option<String> {
        if let Some(url) = existing.get("url").and_then(Value::as_str) {
            return Some(url.to_string());
        }
        existing
            .get("id")
            .and_then(Value::as_i64)
            .map(|id| detail_url(self.api.base_url(), CONFIG_CONTEXT_ENDPOINT, id))
    }
}

impl std::fmt::Debug for ConfigContextReconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigContextReconciler")
            .field("destination", &self.api.base_url())
            .field("resolver", &self.resolver)
            .finish()
    }
}

fn request_body(payload: &ConfigContextPayload) -> Option<Value> {
    match payload.to_value() {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::error!("Cannot serialize config context '{}': {}", payload.name, e);
            None
        }
    }
}

fn log_write_failure(action: &str, payload: &ConfigContextPayload, error: &ClientError) {
    let pretty = serde_json::to_string_pretty(payload).unwrap_or_default();
    match error {
        ClientError::Status { status, body, .. } => tracing::error!(
            "Failed to {} context '{}':\n  Status: {}\n  Response: {}\n  Payload:\n{}",
            action,
            payload.name,
            status,
            body,
            pretty
        ),
        other => tracing::error!(
            "Failed to {} context '{}': {}\n  Payload:\n{}",
            action,
            payload.name,
            other,
            pretty
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbmig_client::Method;
    use nbmig_model::TAG_ENDPOINT;
    use nbmig_test_utils::{config_context, FakeNetbox};
    use serde_json::json;

    const BASE: &str = "http://dest.test";

    fn destination() -> FakeNetbox {
        FakeNetbox::new(BASE)
            .with_object("dcim/regions", json!({"id": 1, "slug": "eu", "name": "Europe"}))
            .with_object(TAG_ENDPOINT, json!({"id": 9, "slug": "prod", "name": "Prod"}))
    }

    fn source_ctx(name: &str, weight: i64) -> Value {
        let mut ctx = config_context(name, weight);
        ctx["regions"] = json!([{"id": 77, "slug": "eu", "name": "Europe"}]);
        ctx["tags"] = json!([5, {"id": 3, "slug": "prod"}]);
        ctx
    }

    /// Destination object in NetBox's nested representation
    fn stored_ctx(name: &str, weight: i64) -> Value {
        let mut ctx = config_context(name, weight);
        ctx["id"] = json!(50);
        ctx["regions"] = json!([{"id": 1, "url": format!("{BASE}/api/dcim/regions/1/"), "slug": "eu"}]);
        ctx["tags"] = json!([{"id": 9, "slug": "prod"}, {"id": 5, "slug": "legacy"}]);
        ctx
    }

    #[tokio::test]
    async fn creates_when_name_is_unknown() {
        let dest = destination();
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let outcome = reconciler.create_or_update(&source_ctx("ctx-A", 100)).await;

        assert_eq!(outcome, Outcome::Created);
        let posts = dest.requests_with(Method::Post);
        assert_eq!(posts.len(), 1);
        let body = posts[0].body.as_ref().unwrap();
        assert_eq!(body["name"], json!("ctx-A"));
        assert_eq!(body["regions"], json!([1]));
        assert_eq!(body["tags"], json!([5, 9]));
        assert_eq!(body["sites"], json!([]));
    }

    #[tokio::test]
    async fn skips_identical_object_without_writing() {
        let dest = destination();
        dest.insert(CONFIG_CONTEXT_ENDPOINT, stored_ctx("ctx-A", 100));
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let outcome = reconciler.create_or_update(&source_ctx("ctx-A", 100)).await;

        assert_eq!(outcome, Outcome::Skipped);
        assert!(dest.writes().is_empty());
    }

    #[tokio::test]
    async fn updates_with_exactly_one_patch() {
        let dest = destination();
        dest.insert(CONFIG_CONTEXT_ENDPOINT, stored_ctx("ctx-A", 200));
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let outcome = reconciler.create_or_update(&source_ctx("ctx-A", 100)).await;

        assert_eq!(outcome, Outcome::Updated);
        let writes = dest.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].method, Method::Patch);
        assert_eq!(writes[0].url, format!("{BASE}/api/extras/config-contexts/50/"));
        assert_eq!(dest.object(CONFIG_CONTEXT_ENDPOINT, 50).unwrap()["weight"], json!(100));
    }

    #[tokio::test]
    async fn second_run_is_all_skipped() {
        let dest = destination();
        let sources = vec![source_ctx("ctx-A", 100), source_ctx("ctx-B", 300)];
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::new(&dest, 100));

        let first = reconciler.reconcile_all(&sources).await;
        assert_eq!(first.created, 2);

        dest.clear_requests();
        let second = reconciler.reconcile_all(&sources).await;
        assert_eq!(second.skipped, 2);
        assert_eq!(second.created + second.updated + second.errors, 0);
        assert!(dest.writes().is_empty());
    }

    #[tokio::test]
    async fn update_clears_stale_assignments() {
        let dest = destination();
        let mut stored = stored_ctx("ctx-A", 100);
        stored["sites"] = json!([{"id": 31, "slug": "old-site"}]);
        dest.insert(CONFIG_CONTEXT_ENDPOINT, stored);
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        assert_eq!(
            reconciler.create_or_update(&source_ctx("ctx-A", 100)).await,
            Outcome::Updated
        );
        assert_eq!(dest.object(CONFIG_CONTEXT_ENDPOINT, 50).unwrap()["sites"], json!([]));
        assert_eq!(
            reconciler.create_or_update(&source_ctx("ctx-A", 100)).await,
            Outcome::Skipped
        );
    }

    #[tokio::test]
    async fn detail_fetch_failure_is_object_error() {
        let dest = destination();
        dest.insert(CONFIG_CONTEXT_ENDPOINT, stored_ctx("ctx-A", 100));
        dest.script(
            Method::Get,
            &format!("{BASE}/api/extras/config-contexts/50/"),
            500,
            json!("boom"),
        );
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let summary = reconciler
            .reconcile_all(&[source_ctx("ctx-A", 100), source_ctx("ctx-B", 100)])
            .await;

        assert_eq!(summary.errors, 1);
        assert_eq!(summary.created, 1);
    }

    #[tokio::test]
    async fn rejected_create_is_error() {
        let dest = destination();
        dest.script(
            Method::Post,
            &format!("{BASE}/api/extras/config-contexts/"),
            400,
            json!({"data": ["This field is required."]}),
        );
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let outcome = reconciler.create_or_update(&source_ctx("ctx-A", 100)).await;
        assert_eq!(outcome, Outcome::Error);
    }

    #[tokio::test]
    async fn rejected_update_is_error_and_loop_continues() {
        let dest = destination();
        dest.insert(CONFIG_CONTEXT_ENDPOINT, stored_ctx("ctx-A", 200));
        dest.script(
            Method::Patch,
            &format!("{BASE}/api/extras/config-contexts/50/"),
            400,
            json!({"weight": ["Ensure this value is less than or equal to 32767."]}),
        );
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        assert_eq!(
            reconciler.create_or_update(&source_ctx("ctx-A", 100)).await,
            Outcome::Error
        );

        let summary = reconciler
            .reconcile_all(&[source_ctx("ctx-A", 100), source_ctx("ctx-B", 100)])
            .await;
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 0);
        assert_eq!(dest.object(CONFIG_CONTEXT_ENDPOINT, 50).unwrap()["weight"], json!(200));
    }

    #[tokio::test]
    async fn name_lookup_failure_never_creates() {
        let dest = destination();
        dest.unreachable(Method::Get, &format!("{BASE}/api/extras/config-contexts/?name=ctx-A"));
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let outcome = reconciler.create_or_update(&source_ctx("ctx-A", 100)).await;

        assert_eq!(outcome, Outcome::Error);
        assert!(dest.writes().is_empty());
    }

    #[tokio::test]
    async fn unreadable_record_is_error_and_loop_continues() {
        let dest = destination();
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        let summary = reconciler
            .reconcile_all(&[json!({"weight": 1}), source_ctx("ctx-A", 100)])
            .await;

        assert_eq!(summary.errors, 1);
        assert_eq!(summary.created, 1);
    }

    #[tokio::test]
    async fn detail_url_falls_back_to_id() {
        let dest = destination();
        let reconciler = ConfigContextReconciler::new(&dest, ReferenceResolver::uncached(&dest));

        assert_eq!(
            reconciler.detail_url_of(&json!({"id": 8})),
            Some(format!("{BASE}/api/extras/config-contexts/8/"))
        );
        assert_eq!(reconciler.detail_url_of(&json!({"name": "x"})), None);
    }
}
