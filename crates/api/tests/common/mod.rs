#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use srd_api::app;
use srd_api::auth::jwt::{generate_access_token, JwtConfig};
use srd_api::auth::password::hash_password;
use srd_api::config::ServerConfig;
use srd_api::state::AppState;
use srd_db::models::user::{CreateUser, User};
use srd_db::repositories::UserRepo;
use srd_monitoring::MonitoringConfig;

pub const TEST_PASSWORD: &str = "secret-password";

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "srd-integration-test-secret".to_string(),
        access_token_expiry_mins: 60,
        refresh_token_expiry_days: 7,
    }
}

/// Build a test `ServerConfig`. Monitoring endpoints default to addresses
/// nothing listens on; tests that talk to the stack pass their own.
pub fn test_config(monitoring: MonitoringConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        jwt: test_jwt(),
        monitoring,
    }
}

/// Monitoring config pointing at `grafana` and at reload URLs nothing
/// answers, with files under `dir`.
pub fn monitoring_config(grafana: &str, dir: &std::path::Path) -> MonitoringConfig {
    MonitoringConfig {
        grafana_url: grafana.to_string(),
        grafana_token: "test-token".to_string(),
        prometheus_url: "http://127.0.0.1:9/".to_string(),
        dashboard_template_path: dir.join("dashboard.json"),
        rules_path: dir.join("prometheus").join("rules.yml"),
        prom_reload_url: "http://127.0.0.1:9/-/reload".to_string(),
        alertmanager_reload_url: "http://127.0.0.1:9/-/reload".to_string(),
        ..MonitoringConfig::default()
    }
}

pub async fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(pool, MonitoringConfig::default()).await
}

/// Build the full application router with the production middleware stack.
pub async fn build_test_app_with(pool: SqlitePool, monitoring: MonitoringConfig) -> Router {
    let config = test_config(monitoring);
    let cors = app::cors_layer(&config.cors_origins).expect("test origins are valid");
    app::build_router(AppState::new(pool, config), cors)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &SqlitePool, email: &str, role: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        name: "Test User".to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_jwt()).expect("token generation")
}

/// Create an admin and return a bearer token for it.
pub async fn admin_token(pool: &SqlitePool) -> String {
    let admin = create_user(pool, "admin@test.local", "admin").await;
    token_for(&admin)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::post(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    put_text_auth(app, uri, &body.to_string(), token).await
}

pub async fn put_text_auth(app: Router, uri: &str, body: &str, token: &str) -> Response {
    let request = Request::put(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::delete(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Fake monitoring stack
// ---------------------------------------------------------------------------

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server");
    });
    format!("http://{addr}")
}

/// A Grafana that accepts every create and records dashboard saves.
/// Set `fail_folders` to make folder creation answer 500.
#[derive(Default)]
pub struct FakeGrafana {
    pub saved: Mutex<Vec<Value>>,
    pub fail_folders: bool,
}

impl FakeGrafana {
    pub async fn start(self) -> (Arc<Self>, String) {
        let fake = Arc::new(self);
        let app = Router::new()
            .route(
                "/api/datasources",
                route_get(|| async { Json(json!([{"uid": "ds-1", "name": "Prometheus", "type": "prometheus"}])) })
                    .post(|| async {
                        Json(json!({"id": 1, "datasource": {"uid": "ds-1", "name": "Prometheus"}}))
                    }),
            )
            .route("/api/folders", post(create_folder))
            .route("/api/dashboards/db", post(save_dashboard))
            .route(
                "/api/search",
                route_get(|| async { Json(json!([{"uid": "srd-api", "title": "SRD", "type": "dash-db"}])) }),
            )
            .route("/api/health", route_get(|| async { Json(json!({"database": "ok"})) }))
            .with_state(Arc::clone(&fake));
        let base = spawn(app).await;
        (fake, base)
    }
}

async fn create_folder(State(fake): State<Arc<FakeGrafana>>, Json(body): Json<Value>) -> Response {
    if fake.fail_folders {
        return (StatusCode::INTERNAL_SERVER_ERROR, "folder store unavailable").into_response();
    }
    Json(json!({"uid": "folder-1", "title": body["title"]})).into_response()
}

async fn save_dashboard(State(fake): State<Arc<FakeGrafana>>, Json(body): Json<Value>) -> Response {
    let uid = body["dashboard"]["uid"].as_str().unwrap_or("generated").to_string();
    fake.saved.lock().unwrap().push(body);
    Json(json!({"status": "success", "uid": uid, "url": format!("/d/{uid}/srd"), "version": 1}))
        .into_response()
}

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
