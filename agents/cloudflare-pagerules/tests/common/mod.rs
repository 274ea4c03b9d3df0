//! Mock Cloudflare API served by axum on an ephemeral local port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use cloudflare_pagerules::{CloudflareClient, Config};

pub const TOKEN: &str = "test-token";

/// Canned responses and per-route hit counters
#[derive(Default)]
pub struct MockApi {
    pub verify: Mutex<Option<(StatusCode, Value)>>,
    /// Body for `GET /zones` without a page parameter
    pub zones_first: Mutex<Option<(StatusCode, Value)>>,
    /// Bodies for `GET /zones?page=N`
    pub zone_pages: Mutex<HashMap<u32, (StatusCode, Value)>>,
    /// Bodies for `GET /zones/{id}/pagerules`
    pub page_rules: Mutex<HashMap<String, (StatusCode, Value)>>,

    pub verify_hits: AtomicUsize,
    pub zones_hits: AtomicUsize,
    pub page_rules_hits: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn verify(&self, status: StatusCode, body: Value) {
        *self.verify.lock().unwrap() = Some((status, body));
    }

    pub fn zones_first(&self, status: StatusCode, body: Value) {
        *self.zones_first.lock().unwrap() = Some((status, body));
    }

    pub fn zone_page(&self, page: u32, status: StatusCode, body: Value) {
        self.zone_pages.lock().unwrap().insert(page, (status, body));
    }

    pub fn page_rules(&self, zone_id: &str, status: StatusCode, body: Value) {
        self.page_rules
            .lock()
            .unwrap()
            .insert(zone_id.to_string(), (status, body));
    }

    pub fn zones_hits(&self) -> usize {
        self.zones_hits.load(Ordering::SeqCst)
    }

    pub fn page_rules_hits(&self) -> usize {
        self.page_rules_hits.load(Ordering::SeqCst)
    }

    pub fn verify_hits(&self) -> usize {
        self.verify_hits.load(Ordering::SeqCst)
    }
}

/// Zones listing body in Cloudflare's envelope
pub fn zones_body(total_pages: u32, zones: &[(&str, &str)]) -> Value {
    let result: Vec<Value> = zones
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    json!({
        "success": true,
        "errors": [],
        "result_info": { "page": 1, "total_pages": total_pages },
        "result": result,
    })
}

fn reply(canned: Option<(StatusCode, Value)>) -> Response {
    match canned {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", TOKEN))
}

async fn verify(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Response {
    api.verify_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "errors": [{ "code": 1000, "message": "Invalid API Token" }] })),
        )
            .into_response();
    }
    let canned = api.verify.lock().unwrap().clone();
    reply(canned)
}

async fn zones(
    State(api): State<Arc<MockApi>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    api.zones_hits.fetch_add(1, Ordering::SeqCst);
    let canned = match params.get("page").and_then(|p| p.parse::<u32>().ok()) {
        Some(page) => api.zone_pages.lock().unwrap().get(&page).cloned(),
        None => api.zones_first.lock().unwrap().clone(),
    };
    reply(canned)
}

async fn page_rules(State(api): State<Arc<MockApi>>, Path(zone_id): Path<String>) -> Response {
    api.page_rules_hits.fetch_add(1, Ordering::SeqCst);
    let canned = api.page_rules.lock().unwrap().get(&zone_id).cloned();
    reply(canned)
}

/// Start the mock server and return its base URL.
pub async fn serve(api: Arc<MockApi>) -> String {
    let app = Router::new()
        .route("/user/tokens/verify", get(verify))
        .route("/zones", get(zones))
        .route("/zones/:zone_id/pagerules", get(page_rules))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn client(base_url: &str) -> CloudflareClient {
    client_with_token(base_url, TOKEN)
}

pub fn client_with_token(base_url: &str, token: &str) -> CloudflareClient {
    let config = Config::new(
        Some(base_url.to_string()),
        Some(token.to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    CloudflareClient::new(&config).unwrap()
}
