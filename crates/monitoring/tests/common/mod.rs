//! In-process fakes for Grafana and the Prometheus/Alertmanager reload
//! endpoints, bound to ephemeral localhost ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Serve `app` on `127.0.0.1:0` and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server");
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Fake Grafana
// ---------------------------------------------------------------------------

/// Minimal stateful Grafana: datasources and folders are unique by name and
/// title, dashboards are saved by uid.
#[derive(Default)]
pub struct FakeGrafana {
    calls: Mutex<Vec<String>>,
    datasources: Mutex<Vec<Value>>,
    folders: Mutex<Vec<Value>>,
    dashboards: Mutex<Vec<Value>>,
    saved: Mutex<Vec<Value>>,
    failures: Mutex<HashMap<String, (u16, String)>>,
    hide_listings: AtomicBool,
    omit_dashboard_url: AtomicBool,
    next_id: AtomicUsize,
}

impl FakeGrafana {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn start(self: &Arc<Self>) -> String {
        let app = Router::new()
            .route("/api/datasources", get(list_datasources).post(create_datasource))
            .route("/api/folders", get(list_folders).post(create_folder))
            .route("/api/dashboards/db", post(save_dashboard))
            .route("/api/search", get(search))
            .route("/api/health", get(health))
            .with_state(Arc::clone(self));
        spawn(app).await
    }

    pub fn seed_datasource(&self, ds: Value) {
        self.datasources.lock().unwrap().push(ds);
    }

    pub fn seed_folder(&self, folder: Value) {
        self.folders.lock().unwrap().push(folder);
    }

    /// Answer `METHOD /path` with the given status and body.
    pub fn fail(&self, route: &str, status: u16, body: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(route.to_string(), (status, body.to_string()));
    }

    /// Keep conflicts on create but return empty listings.
    pub fn hide_listings(&self) {
        self.hide_listings.store(true, Ordering::SeqCst);
    }

    pub fn omit_dashboard_url(&self) {
        self.omit_dashboard_url.store(true, Ordering::SeqCst);
    }

    /// Every request received, as `METHOD /path`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == route).count()
    }

    /// Save requests received on `POST /api/dashboards/db`.
    pub fn saved(&self) -> Vec<Value> {
        self.saved.lock().unwrap().clone()
    }

    pub fn datasource_count(&self) -> usize {
        self.datasources.lock().unwrap().len()
    }

    fn record(&self, method: &Method, uri: &Uri) -> Option<Response> {
        let route = format!("{method} {}", uri.path());
        self.calls.lock().unwrap().push(route.clone());
        self.failures
            .lock()
            .unwrap()
            .get(&route)
            .map(|(status, body)| {
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, body.clone()).into_response()
            })
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn listing(&self, items: &Mutex<Vec<Value>>) -> Vec<Value> {
        if self.hide_listings.load(Ordering::SeqCst) {
            Vec::new()
        } else {
            items.lock().unwrap().clone()
        }
    }
}

type Fake = State<Arc<FakeGrafana>>;

fn conflict(message: &str) -> Response {
    (StatusCode::CONFLICT, Json(json!({ "message": message }))).into_response()
}

async fn list_datasources(State(fake): Fake, method: Method, uri: Uri) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    Json(fake.listing(&fake.datasources)).into_response()
}

async fn create_datasource(State(fake): Fake, method: Method, uri: Uri, Json(body): Json<Value>) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    let mut datasources = fake.datasources.lock().unwrap();
    if datasources.iter().any(|ds| ds["name"] == body["name"]) {
        return conflict("data source with the same name already exists");
    }
    let id = fake.next_id();
    let mut ds = body.clone();
    ds["id"] = json!(id);
    ds["uid"] = json!(format!("ds-{id}"));
    datasources.push(ds.clone());
    Json(json!({
        "id": id,
        "name": body["name"],
        "message": "Datasource added",
        "datasource": ds,
    }))
    .into_response()
}

async fn list_folders(State(fake): Fake, method: Method, uri: Uri) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    Json(fake.listing(&fake.folders)).into_response()
}

async fn create_folder(State(fake): Fake, method: Method, uri: Uri, Json(body): Json<Value>) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    let mut folders = fake.folders.lock().unwrap();
    if folders.iter().any(|f| f["title"] == body["title"]) {
        return conflict("a folder with the same name already exists");
    }
    let id = fake.next_id();
    let folder = json!({ "id": id, "uid": format!("folder-{id}"), "title": body["title"] });
    folders.push(folder.clone());
    Json(folder).into_response()
}

async fn save_dashboard(State(fake): Fake, method: Method, uri: Uri, Json(body): Json<Value>) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    fake.saved.lock().unwrap().push(body.clone());

    let uid = body["dashboard"]["uid"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("gen-{}", fake.next_id()));
    let title = body["dashboard"]["title"].clone();

    let mut dashboards = fake.dashboards.lock().unwrap();
    dashboards.retain(|d| d["uid"] != json!(uid));
    dashboards.push(json!({ "uid": uid, "title": title, "type": "dash-db" }));

    let mut response = json!({ "status": "success", "uid": uid, "version": 1 });
    if !fake.omit_dashboard_url.load(Ordering::SeqCst) {
        response["url"] = json!(format!("/d/{uid}/srd"));
    }
    Json(response).into_response()
}

async fn search(State(fake): Fake, method: Method, uri: Uri) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    Json(fake.dashboards.lock().unwrap().clone()).into_response()
}

async fn health(State(fake): Fake, method: Method, uri: Uri) -> Response {
    if let Some(r) = fake.record(&method, &uri) {
        return r;
    }
    Json(json!({ "database": "ok", "version": "11.0.0" })).into_response()
}

// ---------------------------------------------------------------------------
// Fake reload endpoint
// ---------------------------------------------------------------------------

/// Counts `POST /-/reload` calls and answers with a fixed status.
pub struct FakeReload {
    hits: AtomicUsize,
    status: u16,
}

impl FakeReload {
    pub async fn start(status: u16) -> (Arc<Self>, String) {
        let fake = Arc::new(Self {
            hits: AtomicUsize::new(0),
            status,
        });
        let app = Router::new()
            .route("/-/reload", post(reload))
            .with_state(Arc::clone(&fake));
        let base = spawn(app).await;
        (fake, format!("{base}/-/reload"))
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn reload(State(fake): State<Arc<FakeReload>>) -> StatusCode {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::from_u16(fake.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// A base URL nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

/// A reload URL nothing listens on.
pub async fn dead_url() -> String {
    format!("{}/-/reload", dead_base_url().await)
}
