//! Per-object reconciliation workflows
//!
//! Every object is handled on its own: a failure is logged, recorded as that
//! object's outcome, and the loop moves on.

pub mod config_context;
pub mod local_context;

pub use config_context::ConfigContextReconciler;
pub use local_context::{same_id_fallback, IdFallback, LocalContextReconciler};
