//! NetBox URL construction

/// `<base>/api/<endpoint>/`
#[must_use]
pub fn collection_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/api/{}/",
        base_url.trim_end_matches('/'),
        endpoint.trim_matches('/')
    )
}

/// `<base>/api/<endpoint>/<id>/`
#[must_use]
pub fn detail_url(base_url: &str, endpoint: &str, id: i64) -> String {
    format!("{}{id}/", collection_url(base_url, endpoint))
}

/// First page of a listing: `<base>/api/<endpoint>/?limit=<limit>`
#[must_use]
pub fn page_url(base_url: &str, endpoint: &str, limit: u32) -> String {
    format!("{}?limit={limit}", collection_url(base_url, endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_normalized() {
        assert_eq!(
            collection_url("http://nb.local/", "extras/config-contexts"),
            "http://nb.local/api/extras/config-contexts/"
        );
        assert_eq!(
            collection_url("http://nb.local", "/dcim/sites/"),
            "http://nb.local/api/dcim/sites/"
        );
    }

    #[test]
    fn detail_and_page() {
        assert_eq!(
            detail_url("http://nb.local", "dcim/devices", 42),
            "http://nb.local/api/dcim/devices/42/"
        );
        assert_eq!(
            page_url("http://nb.local", "extras/config-contexts", 0),
            "http://nb.local/api/extras/config-contexts/?limit=0"
        );
    }
}
