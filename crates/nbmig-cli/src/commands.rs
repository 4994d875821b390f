//! Subcommand handlers

use anyhow::Context;
use nbmig_client::HttpClient;
use nbmig_core::{snapshot, workflow, MigrationConfig};
use nbmig_model::LocalContextEntry;
use serde_json::Value;
use std::path::Path;

fn source_client(config: &MigrationConfig) -> anyhow::Result<HttpClient> {
    let settings = config.require_source()?.clone();
    HttpClient::new(settings).context("invalid source settings")
}

fn destination_client(config: &MigrationConfig) -> anyhow::Result<HttpClient> {
    let settings = config.require_destination()?.clone();
    HttpClient::new(settings).context("invalid destination settings")
}

/// `nbmig config-context`
pub(crate) async fn config_context(
    config: &MigrationConfig,
    export_file: Option<&Path>,
    import_file: Option<&Path>,
) -> anyhow::Result<()> {
    let contexts: Vec<Value> = match import_file {
        Some(path) => snapshot::read_snapshot(path).await?,
        None => workflow::fetch_config_contexts(&source_client(config)?).await?,
    };

    if let Some(path) = export_file {
        snapshot::write_snapshot(path, &contexts).await?;
        println!("Exported {} contexts to {}", contexts.len(), path.display());
        return Ok(());
    }

    let dest = destination_client(config)?;
    if import_file.is_none() {
        workflow::check_destination(&dest).await?;
    }

    let summary = workflow::migrate_config_contexts(&dest, &contexts, config).await;
    tracing::info!(
        total = summary.total(),
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        errors = summary.errors,
        "Config context run finished"
    );
    println!("{summary}");
    Ok(())
}

async fn collect(config: &MigrationConfig) -> anyhow::Result<Vec<LocalContextEntry>> {
    let source = source_client(config)?;
    let entries =
        workflow::collect_local_contexts(&source, config.include_devices, config.page_size).await?;
    Ok(entries)
}

async fn apply(config: &MigrationConfig, entries: &[LocalContextEntry]) -> anyhow::Result<()> {
    let dest = destination_client(config)?;
    let summary = workflow::transfer_local_contexts(&dest, entries, config.id_fallback).await;
    tracing::info!(
        total = summary.total(),
        applied = summary.applied,
        failed = summary.failed,
        "Local context run finished"
    );
    println!("{summary}");
    Ok(())
}

/// `nbmig local-context export`
pub(crate) async fn local_context_export(config: &MigrationConfig, output: &Path) -> anyhow::Result<()> {
    let entries = collect(config).await?;
    snapshot::write_snapshot(output, &entries).await?;
    println!("Exported {} objects to {}", entries.len(), output.display());
    Ok(())
}

/// `nbmig local-context import`
pub(crate) async fn local_context_import(config: &MigrationConfig, input: &Path) -> anyhow::Result<()> {
    // fail on bad destination settings before touching the file
    destination_client(config)?;
    let entries: Vec<LocalContextEntry> = snapshot::read_snapshot(input).await?;
    apply(config, &entries).await
}

/// `nbmig local-context transfer`
pub(crate) async fn local_context_transfer(config: &MigrationConfig) -> anyhow::Result<()> {
    destination_client(config)?;
    let entries = collect(config).await?;
    apply(config, &entries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbmig_client::ClientConfig;
    use nbmig_core::MigrateError;

    #[tokio::test]
    async fn import_without_destination_fails_before_reading() {
        let err = local_context_import(&MigrationConfig::new(), Path::new("/nonexistent.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MigrateError>(),
            Some(MigrateError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_import_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = MigrationConfig::new()
            .with_destination(ClientConfig::new("http://127.0.0.1:9", "token"));

        let missing = dir.path().join("missing.json");
        let err = config_context(&config, None, Some(missing.as_path()))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MigrateError>(),
            Some(MigrateError::SnapshotRead { .. })
        ));
    }

    #[tokio::test]
    async fn empty_import_file_reports_zero_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contexts.json");
        std::fs::write(&path, "[]").unwrap();
        let config = MigrationConfig::new()
            .with_destination(ClientConfig::new("http://127.0.0.1:9", "token"));

        config_context(&config, None, Some(path.as_path())).await.unwrap();
    }
}
