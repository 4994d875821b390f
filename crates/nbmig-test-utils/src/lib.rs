//! Testing utilities for nbmig workspace
//!
//! An in-memory NetBox that understands listings with exact-match filters,
//! detail fetches, creates and partial updates, plus fixture builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use nbmig_client::{detail_url, ApiRequest, ApiResponse, ClientError, Method, NetboxApi};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Query parameters that page or shape a listing rather than filter it
const NON_FILTER_PARAMS: [&str; 3] = ["limit", "offset", "brief"];

enum Scripted {
    Respond(u16, Value),
    Unreachable,
}

#[derive(Default)]
struct FakeState {
    collections: HashMap<String, Vec<Value>>,
    next_id: i64,
    scripted: HashMap<(Method, String), Scripted>,
    requests: Vec<ApiRequest>,
}

/// In-memory NetBox instance
pub struct FakeNetbox {
    base_url: String,
    state: Mutex<FakeState>,
}

impl FakeNetbox {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            state: Mutex::new(FakeState {
                next_id: 1,
                ..FakeState::default()
            }),
        }
    }

    /// Builder form of [`FakeNetbox::insert`]
    #[must_use]
    pub fn with_object(self, endpoint: &str, object: Value) -> Self {
        self.insert(endpoint, object);
        self
    }

    /// Store an object, assigning `id` and `url` when missing; returns the id
    pub fn insert(&self, endpoint: &str, mut object: Value) -> i64 {
        let mut state = self.state.lock();
        let id = match object.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                let id = state.next_id;
                object["id"] = json!(id);
                id
            }
        };
        state.next_id = state.next_id.max(id + 1);
        if object.get("url").is_none() {
            object["url"] = json!(detail_url(&self.base_url, endpoint, id));
        }
        state
            .collections
            .entry(endpoint.trim_matches('/').to_string())
            .or_default()
            .push(object);
        id
    }

    /// Answer `method url` with a fixed status and body
    pub fn script(&self, method: Method, url: &str, status: u16, body: Value) {
        self.state
            .lock()
            .scripted
            .insert((method, url.to_string()), Scripted::Respond(status, body));
    }

    /// Make `method url` fail without a response
    pub fn unreachable(&self, method: Method, url: &str) {
        self.state
            .lock()
            .scripted
            .insert((method, url.to_string()), Scripted::Unreachable);
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests received with one verb
    pub fn requests_with(&self, method: Method) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// POST and PATCH requests received
    pub fn writes(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }

    /// Forget recorded requests
    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    /// Objects stored under an endpoint
    pub fn objects(&self, endpoint: &str) -> Vec<Value> {
        self.state
            .lock()
            .collections
            .get(endpoint.trim_matches('/'))
            .cloned()
            .unwrap_or_default()
    }

    /// One stored object by id
    pub fn object(&self, endpoint: &str, id: i64) -> Option<Value> {
        self.objects(endpoint)
            .into_iter()
            .find(|o| o.get("id").and_then(Value::as_i64) == Some(id))
    }

    fn handle(&self, state: &mut FakeState, request: &ApiRequest) -> ApiResponse {
        let (path, mut query) = split_query(&request.url);
        query.extend(request.query.iter().cloned());

        let prefix = format!("{}/api/", self.base_url);
        let Some(route) = path.strip_prefix(&prefix) else {
            return respond(&request.url, 404, json!({"detail": "Not found."}));
        };
        let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
        let detail_id = segments
            .last()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|_| segments.len() > 1);
        let endpoint = match detail_id {
            Some(_) => segments[..segments.len() - 1].join("/"),
            None => segments.join("/"),
        };

        match (request.method, detail_id) {
            (Method::Get, None) => {
                let results: Vec<Value> = state
                    .collections
                    .get(&endpoint)
                    .map(|objects| {
                        objects
                            .iter()
                            .filter(|o| matches_filters(o, &query))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                respond(
                    &request.url,
                    200,
                    json!({"count": results.len(), "next": null, "previous": null, "results": results}),
                )
            }
            (Method::Get, Some(id)) => match find_mut(state, &endpoint, id) {
                Some(object) => respond(&request.url, 200, object.clone()),
                None => respond(&request.url, 404, json!({"detail": "Not found."})),
            },
            (Method::Post, None) => {
                let mut object = request.body.clone().unwrap_or_else(|| json!({}));
                let id = state.next_id;
                state.next_id += 1;
                object["id"] = json!(id);
                object["url"] = json!(detail_url(&self.base_url, &endpoint, id));
                state
                    .collections
                    .entry(endpoint)
                    .or_default()
                    .push(object.clone());
                respond(&request.url, 201, object)
            }
            (Method::Patch, Some(id)) => {
                let changes = request
                    .body
                    .as_ref()
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                match find_mut(state, &endpoint, id) {
                    Some(object) => {
                        if let Some(fields) = object.as_object_mut() {
                            for (key, value) in changes {
                                fields.insert(key, value);
                            }
                        }
                        respond(&request.url, 200, object.clone())
                    }
                    None => respond(&request.url, 404, json!({"detail": "Not found."})),
                }
            }
            _ => respond(&request.url, 405, json!({"detail": "Method not allowed."})),
        }
    }
}

#[async_trait]
impl NetboxApi for FakeNetbox {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        let key = (request.method, request_key(&request));
        match state.scripted.get(&key) {
            Some(Scripted::Respond(status, body)) => {
                return Ok(respond(&request.url, *status, body.clone()))
            }
            Some(Scripted::Unreachable) => {
                return Err(ClientError::transport(&request.url, "connection refused"))
            }
            None => {}
        }

        Ok(self.handle(&mut state, &request))
    }
}

/// URL of a request with its extra query parameters appended
pub fn request_key(request: &ApiRequest) -> String {
    if request.query.is_empty() {
        return request.url.clone();
    }
    let rendered: Vec<String> = request
        .query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    let separator = if request.url.contains('?') { '&' } else { '?' };
    format!("{}{separator}{}", request.url, rendered.join("&"))
}

fn split_query(url: &str) -> (&str, Vec<(String, String)>) {
    match url.split_once('?') {
        Some((path, query)) => (
            path,
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        None => (url, Vec::new()),
    }
}

fn matches_filters(object: &Value, query: &[(String, String)]) -> bool {
    query
        .iter()
        .filter(|(key, _)| !NON_FILTER_PARAMS.contains(&key.as_str()))
        .all(|(key, expected)| match object.get(key) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == *expected,
            _ => false,
        })
}

fn find_mut<'a>(state: &'a mut FakeState, endpoint: &str, id: i64) -> Option<&'a mut Value> {
    state
        .collections
        .get_mut(endpoint)?
        .iter_mut()
        .find(|o| o.get("id").and_then(Value::as_i64) == Some(id))
}

fn respond(url: &str, status: u16, body: Value) -> ApiResponse {
    ApiResponse {
        url: url.to_string(),
        status,
        body,
    }
}

/// Listing page body
pub fn listing(results: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "count": results.len(),
        "next": next,
        "previous": null,
        "results": results,
    })
}

/// Lookup target with slug and name
pub fn named_object(slug: &str, name: &str) -> Value {
    json!({"slug": slug, "name": name})
}

/// Source-side config context with every assignment field empty
pub fn config_context(name: &str, weight: i64) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), json!(name));
    object.insert("weight".to_string(), json!(weight));
    object.insert("data".to_string(), json!({"ntp_servers": ["10.0.0.1"]}));
    object.insert("is_active".to_string(), json!(true));
    object.insert("description".to_string(), json!(""));
    for field in nbmig_model::AssignmentField::ALL {
        object.insert(field.as_str().to_string(), json!([]));
    }
    Value::Object(object)
}

/// Source-side listing item carrying local context data
pub fn local_context_object(id: i64, name: &str, data: Value) -> Value {
    json!({"id": id, "name": name, "local_context_data": data})
}
