//! Paginated listing fetcher
//!
//! Follows `next` links until the server stops sending one. The first page is
//! mandatory; a failure on any later page ends pagination but keeps what was
//! already collected.

use crate::error::MigrateError;
use nbmig_client::{ApiRequest, ClientError, NetboxApi};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// One listing page
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next: Option<String>,
}

async fn fetch_page(api: &dyn NetboxApi, url: &str) -> Result<Page, PageError> {
    let response = api
        .send(ApiRequest::get(url))
        .await?
        .error_for_status()?;
    Ok(serde_json::from_value(response.body)?)
}

#[derive(Debug)]
enum PageError {
    Client(ClientError),
    Malformed(serde_json::Error),
}

impl From<ClientError> for PageError {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}

impl From<serde_json::Error> for PageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err)
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(e) => write!(f, "{e}"),
            Self::Malformed(e) => write!(f, "malformed page: {e}"),
        }
    }
}

/// Fetch every page of a listing, starting at `first_page`
///
/// `first_page` is a full URL including its query string, e.g.
/// `https://nb/api/extras/config-contexts/?limit=0`. Results are returned in
/// page order.
pub async fn fetch_all(api: &dyn NetboxApi, first_page: &str) -> Result<Vec<Value>, MigrateError> {
    let page = fetch_page(api, first_page).await.map_err(|e| match e {
        PageError::Client(source) => MigrateError::SourceFetch {
            url: first_page.to_string(),
            source,
        },
        PageError::Malformed(source) => MigrateError::MalformedPage {
            url: first_page.to_string(),
            source,
        },
    })?;

    let mut items = page.results;
    let mut next = page.next;
    let mut visited = HashSet::from([first_page.to_string()]);
    let mut pages = 1usize;

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            tracing::warn!("Pagination loop detected at {}, stopping", url);
            break;
        }
        match fetch_page(api, &url).await {
            Ok(page) => {
                pages += 1;
                items.extend(page.results);
                next = page.next;
            }
            Err(e) => {
                tracing::error!(
                    "Error during pagination at {}: {}; keeping {} results",
                    url,
                    e,
                    items.len()
                );
                break;
            }
        }
    }

    tracing::debug!("Fetched {} results over {} pages from {}", items.len(), pages, first_page);
    Ok(items)
}
