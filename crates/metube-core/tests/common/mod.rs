// Not every test binary uses every helper
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use metube_core::{ApiClient, ApiConfig, Channel, SubscriptionCache, Syncer};

pub const API_KEY: &str = "test-key";
pub const MY_CHANNEL: &str = "UCme";

/// Canned responses served by the fake API.
#[derive(Default)]
pub struct FakeApi {
    /// Subscription pages with the `nextPageToken` each one returns.
    pub subscription_pages: Vec<(Vec<Channel>, Option<String>)>,
    /// Status returned for a subscription page request, keyed by page index.
    pub subscription_errors: HashMap<usize, u16>,
    pub videos: HashMap<String, Vec<String>>,
    /// Channels whose search request fails with the given status.
    pub video_errors: HashMap<String, u16>,
    /// Images that fail with the given status. Everything else succeeds.
    pub image_errors: HashMap<String, u16>,
    /// Query strings of every API request, in arrival order.
    pub requests: Mutex<Vec<HashMap<String, String>>>,
}

impl FakeApi {
    /// Chain pages with tokens "p1", "p2", ..., leaving the last without one.
    pub fn with_pages(pages: Vec<Vec<Channel>>) -> Self {
        let count = pages.len();
        let subscription_pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| {
                let token = (i + 1 < count).then(|| format!("p{}", i + 1));
                (page, token)
            })
            .collect();
        Self {
            subscription_pages,
            ..Self::default()
        }
    }

    pub fn page_requests(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.get("part").map(String::as_str) == Some("snippet"))
            .count()
    }
}

fn google_error(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    let body = json!({"error": {"code": status.as_u16(), "message": message, "errors": []}});
    (status, Json(body)).into_response()
}

fn check_key(query: &HashMap<String, String>) -> Option<Response> {
    if query.get("key").map(String::as_str) != Some(API_KEY) {
        return Some(google_error(400, "API key not valid"));
    }
    None
}

async fn subscriptions(
    State(api): State<Arc<FakeApi>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.requests.lock().unwrap().push(query.clone());
    if let Some(err) = check_key(&query) {
        return err;
    }
    assert_eq!(query.get("channelId").map(String::as_str), Some(MY_CHANNEL));

    let index = match query.get("pageToken") {
        None => 0,
        Some(token) => match api
            .subscription_pages
            .iter()
            .position(|(_, next)| next.as_deref() == Some(token.as_str()))
        {
            Some(prev) => prev + 1,
            None => return google_error(400, "invalid page token"),
        },
    };

    if let Some(status) = api.subscription_errors.get(&index) {
        return google_error(*status, "subscriptions forbidden");
    }

    let (channels, next) = &api.subscription_pages[index];
    let items: Vec<_> = channels
        .iter()
        .map(|c| {
            json!({
                "kind": "youtube#subscription",
                "snippet": {
                    "title": c.title,
                    "resourceId": {"kind": "youtube#channel", "channelId": c.id},
                    "thumbnails": {"high": {"url": c.thumbnail}}
                }
            })
        })
        .collect();

    let mut body = json!({"kind": "youtube#subscriptionListResponse", "items": items});
    if let Some(token) = next {
        body["nextPageToken"] = json!(token);
    }
    Json(body).into_response()
}

async fn search(
    State(api): State<Arc<FakeApi>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.requests.lock().unwrap().push(query.clone());
    if let Some(err) = check_key(&query) {
        return err;
    }
    assert_eq!(query.get("type").map(String::as_str), Some("video"));
    assert_eq!(query.get("order").map(String::as_str), Some("date"));

    let channel = query.get("channelId").cloned().unwrap_or_default();
    if let Some(status) = api.video_errors.get(&channel) {
        return google_error(*status, "quotaExceeded");
    }

    let items: Vec<_> = api
        .videos
        .get(&channel)
        .into_iter()
        .flatten()
        .map(|id| json!({"kind": "youtube#searchResult", "id": {"kind": "youtube#video", "videoId": id}}))
        .collect();
    Json(json!({"kind": "youtube#searchListResponse", "items": items})).into_response()
}

async fn image(State(api): State<Arc<FakeApi>>, Path(name): Path<String>) -> Response {
    if let Some(status) = api.image_errors.get(&name) {
        return StatusCode::from_u16(*status).unwrap().into_response();
    }
    image_bytes(&name).into_response()
}

/// Body served for a successful image request.
pub fn image_bytes(name: &str) -> Vec<u8> {
    format!("jpeg:{}", name).into_bytes()
}

/// A bound listener, so URLs can be built before the fake is finalized.
pub struct TestServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl TestServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/v3", self.addr)
    }

    pub fn image_url(&self, name: &str) -> String {
        format!("http://{}/img/{}", self.addr, name)
    }

    pub fn serve(self, api: FakeApi) -> Arc<FakeApi> {
        let api = Arc::new(api);
        let app = Router::new()
            .route("/v3/subscriptions", get(subscriptions))
            .route("/v3/search", get(search))
            .route("/img/:name", get(image))
            .with_state(api.clone());
        tokio::spawn(async move {
            axum::serve(self.listener, app).await.unwrap();
        });
        api
    }
}

pub fn client(api_base: &str) -> ApiClient {
    ApiClient::new(ApiConfig::new(API_KEY).with_base_url(api_base)).unwrap()
}

pub fn syncer(api_base: &str, cache_path: &std::path::Path) -> Syncer {
    Syncer::new(client(api_base), SubscriptionCache::new(cache_path), MY_CHANNEL)
}

/// Channels named `c{n}` / "Chan {n}" with thumbnails on the test server.
pub fn channels(server: &TestServer, range: std::ops::Range<usize>) -> Vec<Channel> {
    range
        .map(|n| {
            Channel::new(
                format!("c{}", n),
                format!("Chan {}", n),
                server.image_url(&format!("{}.jpg", n)),
            )
        })
        .collect()
}
