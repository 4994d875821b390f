//! nbmig Model - records exchanged between two NetBox instances
//!
//! Defines the shapes the reconciliation engine reads and writes:
//! - Config contexts and their 13 assignment fields
//! - Source-side references and their lookup terms
//! - Destination write payloads built from resolved ids
//! - Local context entries attached to devices and virtual machines
//! - Per-object outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use nbmig_model::{ConfigContext, ConfigContextPayload, ReferenceMapping};
//!
//! let ctx: ConfigContext = serde_json::from_value(raw)?;
//! let payload = ConfigContextPayload::new(&ctx, ReferenceMapping::new());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod assignment;
pub mod config_context;
pub mod error;
pub mod local_context;
pub mod outcome;
pub mod reference;

pub use assignment::{AssignmentField, Assignments, LookupKey, ResolveStrategy, TAG_ENDPOINT};
pub use config_context::{ConfigContext, ConfigContextPayload, ReferenceMapping, DEFAULT_WEIGHT};
pub use error::ModelError;
pub use local_context::{LocalContextEntry, ObjectKind};
pub use outcome::{LocalOutcome, Outcome};
pub use reference::Reference;

/// Collection path of config contexts, relative to `<base>/api/`
pub const CONFIG_CONTEXT_ENDPOINT: &str = "extras/config-contexts";
