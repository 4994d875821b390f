//! nbmig Client - NetBox REST transport
//!
//! The reconciliation engine only needs a capability that sends a request and
//! hands back a status and a JSON body. [`NetboxApi`] is that seam;
//! [`HttpClient`] implements it over reqwest with token authentication.
//!
//! # Example
//!
//! ```rust,ignore
//! use nbmig_client::{ClientConfig, HttpClient, NetboxApi};
//!
//! let client = HttpClient::new(ClientConfig::new("https://netbox.example.com", "0123abcd"))?;
//! let url = client.collection_url("extras/config-contexts");
//! let page = client.get_json(&url, &[("limit", "1")]).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod url;

pub use api::{ApiRequest, ApiResponse, Method, NetboxApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpClient;
pub use url::{collection_url, detail_url, page_url};
