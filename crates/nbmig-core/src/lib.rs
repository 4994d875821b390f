//! nbmig Core - reconciliation engine
//!
//! Moves config contexts and local context data from a source NetBox to a
//! destination NetBox:
//! - Fetches complete source listings across pagination
//! - Resolves source references to destination ids
//! - Diffs existing destination objects against the source
//! - Creates, updates or skips each object independently
//! - Tallies per-object outcomes for the run summary
//!
//! # Example
//!
//! ```rust,ignore
//! use nbmig_core::{workflow, MigrationConfig};
//!
//! # async fn example(source: &dyn NetboxApi, dest: &dyn NetboxApi) -> Result<(), MigrateError> {
//! let config = MigrationConfig::new();
//! let contexts = workflow::fetch_config_contexts(source).await?;
//! workflow::check_destination(dest).await?;
//! let summary = workflow::migrate_config_contexts(dest, &contexts, &config).await;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod diff;
pub mod error;
pub mod fetcher;
pub mod reconcile;
pub mod resolver;
pub mod snapshot;
pub mod summary;
pub mod workflow;

pub use config::MigrationConfig;
pub use diff::{diff_context, needs_update, ContextDiff};
pub use error::MigrateError;
pub use fetcher::fetch_all;
pub use reconcile::{ConfigContextReconciler, IdFallback, LocalContextReconciler};
pub use resolver::ReferenceResolver;
pub use summary::{ConfigContextSummary, LocalContextSummary};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a migration
    pub use crate::{
        ConfigContextReconciler, ConfigContextSummary, IdFallback, LocalContextReconciler,
        LocalContextSummary, MigrateError, MigrationConfig, ReferenceResolver,
    };
    pub use nbmig_client::{ClientConfig, HttpClient, NetboxApi};
    pub use nbmig_model::{LocalContextEntry, LocalOutcome, ObjectKind, Outcome};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
