#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use starred_releases::github::GitHubClient;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

pub const TEST_TOKEN: &str = "test_token";

/// Canned reply of the fake endpoint
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body,
            delay: None,
        }
    }

    pub fn status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
            delay: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Holds the reply back, keeping the request in flight.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as seen by the fake endpoint
#[derive(Debug, Clone)]
pub struct Received {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct FakeState {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    received: Arc<Mutex<Vec<Received>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// In-process GraphQL endpoint answering with queued replies in order.
pub struct FakeGitHub {
    pub url: Url,
    state: FakeState,
}

impl FakeGitHub {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let state = FakeState {
            replies: Arc::new(Mutex::new(replies.into())),
            received: Arc::new(Mutex::new(Vec::new())),
            ..Default::default()
        };

        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake GitHub");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake GitHub crashed");
        });

        let url = Url::parse(&format!("http://{}/graphql", addr)).expect("Invalid fake URL");
        FakeGitHub { url, state }
    }

    pub fn client(&self) -> GitHubClient {
        GitHubClient::with_endpoint(TEST_TOKEN.to_string(), self.url.clone())
            .expect("Failed to create client")
    }

    pub async fn received(&self) -> Vec<Received> {
        self.state.received.lock().await.clone()
    }

    /// Most requests that were being answered at the same time
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn graphql(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, HeaderMap, Json<Value>) {
    state.received.lock().await.push(Received {
        authorization: headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        body,
    });

    let in_flight = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

    let reply = state.replies.lock().await.pop_front();
    if let Some(delay) = reply.as_ref().and_then(|reply| reply.delay) {
        tokio::time::sleep(delay).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    match reply {
        Some(reply) => {
            let mut headers = HeaderMap::new();
            for (name, value) in reply.headers {
                headers.insert(
                    HeaderName::from_static(name),
                    HeaderValue::from_str(&value).expect("Invalid header value"),
                );
            }
            (reply.status, headers, Json(reply.body))
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
            Json(json!({ "message": "no reply queued" })),
        ),
    }
}

// Fixtures

pub fn rate_limit_json(remaining: u32) -> Value {
    json!({
        "cost": 1,
        "limit": 5000,
        "remaining": remaining,
        "used": 5000 - remaining,
        "resetAt": "2024-06-01T12:00:00Z"
    })
}

pub fn repository_info_json() -> Value {
    json!({
        "description": "A fast line-oriented regex search tool",
        "languages": {
            "nodes": [
                { "id": "MDg6TGFuZ3VhZ2UyOTc=", "name": "Rust" },
                { "id": "MDg6TGFuZ3VhZ2UxMzk=", "name": "Shell" }
            ]
        },
        "licenseInfo": { "spdxId": "MIT" },
        "name": "ripgrep",
        "owner": {
            "avatarUrl": "https://avatars.githubusercontent.com/u/456674?v=4",
            "login": "BurntSushi",
            "url": "https://github.com/BurntSushi"
        },
        "primaryLanguage": { "id": "MDg6TGFuZ3VhZ2UyOTc=", "name": "Rust" },
        "stargazerCount": 48000,
        "url": "https://github.com/BurntSushi/ripgrep"
    })
}

pub fn release_json(id: &str, tag: &str, published_at: &str, with_description: bool) -> Value {
    let mut release = json!({
        "id": id,
        "isDraft": false,
        "isPrerelease": false,
        "name": tag,
        "publishedAt": published_at,
        "url": format!("https://github.com/BurntSushi/ripgrep/releases/tag/{}", tag)
    });
    if with_description {
        release["descriptionHTML"] = json!(format!("<p>Release {}</p>", tag));
    }
    release
}

pub fn repository_json(with_description: bool) -> Value {
    let mut repository = repository_info_json();
    repository["releases"] = json!({
        "nodes": [
            release_json("RE_kwDOAxHvZs4Hx1", "14.1.0", "2024-01-06T17:00:00Z", with_description),
            release_json("RE_kwDOAxHvZs4Gk2", "14.0.0", "2023-11-26T18:00:00Z", with_description)
        ]
    });
    repository
}

pub fn starred_data_json(with_description: bool, end_cursor: &str, has_next_page: bool) -> Value {
    json!({
        "viewer": {
            "starredRepositories": {
                "totalCount": 42,
                "pageInfo": {
                    "startCursor": "Y3Vyc29yOnYyOpK5MjAyNC0wNS0wMVQwMDowMDowMFo=",
                    "hasPreviousPage": false,
                    "endCursor": end_cursor,
                    "hasNextPage": has_next_page
                },
                "nodes": [repository_json(with_description)]
            }
        },
        "rateLimit": rate_limit_json(4999)
    })
}

pub fn descriptions_data_json() -> Value {
    json!({
        "nodes": [
            { "id": "RE_kwDOAxHvZs4Hx1", "descriptionHTML": "<p>Release 14.1.0</p>" },
            { "id": "RE_kwDOAxHvZs4Gk2", "descriptionHTML": "<p>Release 14.0.0</p>" }
        ],
        "rateLimit": rate_limit_json(4998)
    })
}

/// Wraps `data` the way the API does.
pub fn graphql_ok(data: Value) -> Value {
    json!({ "data": data })
}

/// All key paths of a JSON value; arrays are transparent.
pub fn json_paths(value: &Value) -> std::collections::BTreeSet<String> {
    fn walk(value: &Value, prefix: &str, out: &mut std::collections::BTreeSet<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    out.insert(path.clone());
                    walk(child, &path, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, prefix, out);
                }
            }
            _ => {}
        }
    }

    let mut out = std::collections::BTreeSet::new();
    walk(value, "", &mut out);
    out
}
