//! Submission flow against an in-process git API stand-in.
//!
//! The server scripts the object-graph endpoints and records what the
//! client asked for, so the tests can pin down which revision the store
//! read its documents at and which parent its commits were built on.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use growlog::auth::Credentials;
use growlog::cache::OfflineCache;
use growlog::config::Config;
use growlog::journal::{Entry, JournalError, JournalStore, NewExperiment};
use growlog::remote::{GitClient, RemoteError};

// ============================================
// Scripted git API
// ============================================

struct GitApi {
    /// Current branch head; moved by a successful ref update
    head: Mutex<String>,
    /// Every contents read, as (repository path, ref it was read at)
    content_reads: Mutex<Vec<(String, String)>>,
    /// Bodies of every commit-object creation
    commit_bodies: Mutex<Vec<Value>>,
    /// Reject the next ref update as non-fast-forward
    reject_ref_update: AtomicBool,
    /// Answer the next ref update with a rate-limit response
    rate_limit_ref_update: AtomicBool,
}

impl GitApi {
    fn new(head: &str) -> Arc<Self> {
        Arc::new(Self {
            head: Mutex::new(head.to_string()),
            content_reads: Mutex::new(Vec::new()),
            commit_bodies: Mutex::new(Vec::new()),
            reject_ref_update: AtomicBool::new(false),
            rate_limit_ref_update: AtomicBool::new(false),
        })
    }

    fn head(&self) -> String {
        self.head.lock().unwrap().clone()
    }

    fn content_reads(&self) -> Vec<(String, String)> {
        self.content_reads.lock().unwrap().clone()
    }

    fn commit_parents(&self) -> Vec<Vec<String>> {
        self.commit_bodies
            .lock()
            .unwrap()
            .iter()
            .map(|body| {
                body["parents"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|p| p.as_str().unwrap().to_string())
                    .collect()
            })
            .collect()
    }
}

async fn get_ref(State(api): State<Arc<GitApi>>) -> Json<Value> {
    Json(json!({
        "ref": "refs/heads/main",
        "object": { "sha": api.head(), "type": "commit" }
    }))
}

async fn get_commit(Path(sha): Path<String>) -> Json<Value> {
    Json(json!({
        "sha": sha,
        "tree": { "sha": format!("tree-{}", sha) },
        "parents": [],
        "message": "previous"
    }))
}

async fn get_contents(
    State(api): State<Arc<GitApi>>,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let reference = query.get("ref").cloned().unwrap_or_default();
    api.content_reads
        .lock()
        .unwrap()
        .push((path.clone(), reference));

    if path == "data/basil/index.json" {
        let doc = json!({ "entries": [] }).to_string();
        return Json(json!({
            "sha": "file-sha",
            "encoding": "base64",
            "content": BASE64.encode(doc)
        }))
        .into_response();
    }
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response()
}

async fn create_blob() -> Json<Value> {
    Json(json!({ "sha": "blob-sha" }))
}

async fn create_tree() -> Json<Value> {
    Json(json!({ "sha": "tree-new" }))
}

async fn create_commit(State(api): State<Arc<GitApi>>, Json(body): Json<Value>) -> Json<Value> {
    api.commit_bodies.lock().unwrap().push(body);
    Json(json!({ "sha": "commit-new" }))
}

async fn update_ref(State(api): State<Arc<GitApi>>, Json(body): Json<Value>) -> Response {
    if api.rate_limit_ref_update.load(Ordering::SeqCst) {
        let reset = (Utc::now().timestamp() + 90).to_string();
        return (
            StatusCode::FORBIDDEN,
            [
                ("X-RateLimit-Remaining", "0".to_string()),
                ("X-RateLimit-Reset", reset),
            ],
            Json(json!({ "message": "API rate limit exceeded" })),
        )
            .into_response();
    }
    if api.reject_ref_update.load(Ordering::SeqCst) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Update is not a fast forward" })),
        )
            .into_response();
    }

    let sha = body["sha"].as_str().unwrap().to_string();
    *api.head.lock().unwrap() = sha.clone();
    Json(json!({
        "ref": "refs/heads/main",
        "object": { "sha": sha, "type": "commit" }
    }))
    .into_response()
}

async fn serve(api: Arc<GitApi>) -> SocketAddr {
    let router = Router::new()
        .route("/repos/alice/greenhouse/git/ref/heads/main", get(get_ref))
        .route("/repos/alice/greenhouse/git/commits/:sha", get(get_commit))
        .route("/repos/alice/greenhouse/git/blobs", post(create_blob))
        .route("/repos/alice/greenhouse/git/trees", post(create_tree))
        .route("/repos/alice/greenhouse/git/commits", post(create_commit))
        .route(
            "/repos/alice/greenhouse/git/refs/heads/main",
            patch(update_ref),
        )
        .route("/repos/alice/greenhouse/contents/*path", get(get_contents))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn store_for(addr: SocketAddr) -> JournalStore {
    let mut config = Config::default();
    config.remote.api_base = format!("http://{}", addr);

    let creds = Credentials::new("test-token", "alice", "greenhouse");
    let client = GitClient::new(&config.remote, &creds).unwrap();
    JournalStore::new(client, OfflineCache::disabled(), &config)
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// ============================================
// Tests
// ============================================

#[tokio::test]
async fn test_submit_reads_index_at_resolved_head() {
    let api = GitApi::new("aaa111");
    let addr = serve(api.clone()).await;
    let store = store_for(addr);

    let receipt = store
        .submit("basil", Entry::new(date("2026-08-26")), &[])
        .await
        .unwrap();

    assert_eq!(receipt.entry_file, "2026-08-26.json");
    assert_eq!(receipt.commit_sha, "commit-new");

    // The index was read at the resolved head SHA, not at the branch name,
    // and the commit was built on that same head.
    assert_eq!(
        api.content_reads(),
        vec![("data/basil/index.json".to_string(), "aaa111".to_string())]
    );
    assert_eq!(api.commit_parents(), vec![vec!["aaa111".to_string()]]);
    assert_eq!(api.head(), "commit-new");
}

#[tokio::test]
async fn test_submit_surfaces_concurrent_ref_update_as_conflict() {
    let api = GitApi::new("aaa111");
    api.reject_ref_update.store(true, Ordering::SeqCst);
    let addr = serve(api.clone()).await;
    let store = store_for(addr);

    let err = store
        .submit("basil", Entry::new(date("2026-08-26")), &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        JournalError::Remote(RemoteError::RefConflict(_))
    ));
    // The losing submission must not have moved the branch
    assert_eq!(api.head(), "aaa111");
}

#[tokio::test]
async fn test_submit_maps_ref_update_rate_limit() {
    let api = GitApi::new("aaa111");
    api.rate_limit_ref_update.store(true, Ordering::SeqCst);
    let addr = serve(api.clone()).await;
    let store = store_for(addr);

    let err = store
        .submit("basil", Entry::new(date("2026-08-26")), &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        JournalError::Remote(RemoteError::RateLimited(_))
    ));
}

#[tokio::test]
async fn test_create_experiment_reads_list_at_resolved_head() {
    let api = GitApi::new("bbb222");
    let addr = serve(api.clone()).await;
    let store = store_for(addr);

    store
        .create_experiment(NewExperiment {
            slug: "basil".to_string(),
            name: "Basil DWC".to_string(),
            description: String::new(),
            started: date("2026-08-20"),
        })
        .await
        .unwrap();

    let reads = api.content_reads();
    assert_eq!(
        reads[0],
        ("data/experiments.json".to_string(), "bbb222".to_string())
    );
    assert_eq!(api.commit_parents(), vec![vec!["bbb222".to_string()]]);
    assert_eq!(api.head(), "commit-new");
}
