//! Top-level workflows
//!
//! Thin orchestration over the fetcher and the reconcilers. Each function is
//! one step of a run; the command line chains them.

use crate::config::MigrationConfig;
use crate::error::MigrateError;
use crate::fetcher::fetch_all;
use crate::reconcile::{ConfigContextReconciler, IdFallback, LocalContextReconciler};
use crate::resolver::ReferenceResolver;
use crate::summary::{ConfigContextSummary, LocalContextSummary};
use nbmig_client::{page_url, ApiRequest, NetboxApi};
use nbmig_model::{LocalContextEntry, ObjectKind, CONFIG_CONTEXT_ENDPOINT};
use serde_json::Value;

/// Verify the destination answers a minimal config context listing
pub async fn check_destination(api: &dyn NetboxApi) -> Result<(), MigrateError> {
    let url = page_url(api.base_url(), CONFIG_CONTEXT_ENDPOINT, 1);
    let unreachable = |source| MigrateError::DestinationUnreachable {
        url: url.clone(),
        source,
    };
    api.send(ApiRequest::get(url.as_str()))
        .await
        .and_then(|response| response.error_for_status())
        .map_err(unreachable)?;
    tracing::debug!("Destination {} is reachable", api.base_url());
    Ok(())
}

/// Fetch every config context from the source
pub async fn fetch_config_contexts(api: &dyn NetboxApi) -> Result<Vec<Value>, MigrateError> {
    let url = page_url(api.base_url(), CONFIG_CONTEXT_ENDPOINT, 0);
    tracing::info!("Fetching config contexts from {}", api.base_url());
    let contexts = fetch_all(api, &url).await?;
    tracing::info!("Found {} config contexts", contexts.len());
    Ok(contexts)
}

/// Create or update every config context on the destination
pub async fn migrate_config_contexts(
    dest: &dyn NetboxApi,
    contexts: &[Value],
    config: &MigrationConfig,
) -> ConfigContextSummary {
    let resolver = ReferenceResolver::new(dest, config.lookup_cache_capacity);
    ConfigContextReconciler::new(dest, resolver)
        .reconcile_all(contexts)
        .await
}

/// Collect non-empty local context data from the source
///
/// Virtual machines are always listed, devices only when `include_devices`
/// is set. Listing items that cannot be read are skipped with a warning.
pub async fn collect_local_contexts(
    source: &dyn NetboxApi,
    include_devices: bool,
    page_size: u32,
) -> Result<Vec<LocalContextEntry>, MigrateError> {
    let mut entries = Vec::new();
    for kind in ObjectKind::collected(include_devices) {
        let url = page_url(source.base_url(), kind.endpoint(), page_size);
        let items = fetch_all(source, &url).await?;
        let before = entries.len();
        for item in &items {
            match LocalContextEntry::from_listing(kind, item) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable {}: {}", kind, e),
            }
        }
        tracing::info!(
            "Collected {} of {} {} objects with local context",
            entries.len() - before,
            items.len(),
            kind
        );
    }
    Ok(entries)
}

/// Patch local context data onto the destination
pub async fn transfer_local_contexts(
    dest: &dyn NetboxApi,
    entries: &[LocalContextEntry],
    fallback: IdFallback,
) -> LocalContextSummary {
    LocalContextReconciler::new(dest, fallback)
        .apply_all(entries)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbmig_client::Method;
    use nbmig_test_utils::{listing, local_context_object, FakeNetbox};
    use serde_json::json;

    const SRC: &str = "http://src.test";
    const DEST: &str = "http://dest.test";

    #[tokio::test]
    async fn destination_check_uses_limit_one() {
        let dest = FakeNetbox::new(DEST);
        check_destination(&dest).await.unwrap();
        assert_eq!(
            dest.requests()[0].url,
            format!("{DEST}/api/extras/config-contexts/?limit=1")
        );
    }

    #[tokio::test]
    async fn destination_check_failure_is_fatal() {
        let dest = FakeNetbox::new(DEST);
        dest.script(
            Method::Get,
            &format!("{DEST}/api/extras/config-contexts/?limit=1"),
            403,
            json!({"detail": "Invalid token"}),
        );

        let err = check_destination(&dest).await.unwrap_err();
        assert!(matches!(err, MigrateError::DestinationUnreachable { .. }));
    }

    #[tokio::test]
    async fn config_context_fetch_requests_limit_zero() {
        let source = FakeNetbox::new(SRC);
        source.unreachable(Method::Get, &format!("{SRC}/api/extras/config-contexts/?limit=0"));

        let err = fetch_config_contexts(&source).await.unwrap_err();
        assert!(matches!(err, MigrateError::SourceFetch { .. }));
    }

    #[tokio::test]
    async fn collects_vms_only_by_default() {
        let source = FakeNetbox::new(SRC)
            .with_object(
                "virtualization/virtual-machines",
                local_context_object(42, "vm-7", json!({"dns": ["10.0.0.53"]})),
            )
            .with_object(
                "virtualization/virtual-machines",
                local_context_object(43, "vm-8", json!({})),
            )
            .with_object(
                "dcim/devices",
                local_context_object(5, "sw-1", json!({"snmp": "ro"})),
            );

        let entries = collect_local_contexts(&source, false, 1000).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "vm-7");
        assert_eq!(entries[0].kind, ObjectKind::VirtualMachine);
        assert_eq!(
            source.requests()[0].url,
            format!("{SRC}/api/virtualization/virtual-machines/?limit=1000")
        );

        let with_devices = collect_local_contexts(&source, true, 1000).await.unwrap();
        assert_eq!(with_devices.len(), 2);
        assert_eq!(with_devices[1].kind, ObjectKind::Device);
    }

    #[tokio::test]
    async fn unreadable_listing_item_is_skipped() {
        let source = FakeNetbox::new(SRC);
        source.script(
            Method::Get,
            &format!("{SRC}/api/virtualization/virtual-machines/?limit=50"),
            200,
            listing(
                vec![
                    json!({"id": "x", "name": "bad", "local_context_data": {"a": 1}}),
                    local_context_object(2, "good", json!({"a": 1})),
                ],
                None,
            ),
        );

        let entries = collect_local_contexts(&source, false, 50).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 2);
    }
}
