//! HTTP API.
//!
//! Every JSON response is wrapped as `{success, data, error}`. Handlers run
//! the stores directly; writers hold [`AppState::write_lock`] across their
//! read-modify-write so concurrent requests cannot interleave on one file.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::analytics::Analytics;
use crate::archive_store::ArchiveStore;
use crate::config::Config;
use crate::db::Workspace;
use crate::error::Error;
use crate::project_store::ProjectStore;
use crate::prompt_seed::seed_default_prompts;
use crate::prompt_store::PromptStore;
use crate::task_store::TaskStore;
use crate::template_store::TemplateStore;

mod analytics;
mod archives;
mod projects;
mod prompts;
mod tasks;
mod templates;

/// Stores shared by every handler.
pub struct AppState {
    pub templates: TemplateStore,
    pub prompts: PromptStore,
    pub projects: ProjectStore,
    pub tasks: TaskStore,
    pub archives: ArchiveStore,
    pub analytics: Analytics,
    pub write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(workspace: &Workspace) -> Self {
        AppState {
            templates: TemplateStore::new(workspace),
            prompts: PromptStore::new(workspace),
            projects: ProjectStore::new(workspace),
            tasks: TaskStore::new(workspace),
            archives: ArchiveStore::new(workspace),
            analytics: Analytics::new(workspace),
            write_lock: Mutex::new(()),
        }
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse { success: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse { success: false, data: None, error: Some(message.into()) }
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), Error>;

pub(crate) fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(data))))
}

pub(crate) fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::Io(_) | Error::Json(_) => {
                error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::validation(rejection.body_text())
    }
}

/// JSON body extractor whose rejections come back enveloped.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Body<T>(pub T);

/// Query string extractor whose rejections come back enveloped.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Params<T>(pub T);

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
}

async fn health() -> ApiResult<Health> {
    ok(Health { status: "ok", timestamp: chrono::Utc::now().to_rfc3339() })
}

async fn fallback() -> Error {
    Error::not_found("Route not found")
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(templates::routes())
        .merge(prompts::routes())
        .merge(projects::routes())
        .merge(tasks::routes())
        .merge(archives::routes())
        .merge(analytics::routes())
        .fallback(fallback)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config) -> crate::error::Result<()> {
    let workspace = config.workspace();
    workspace.ensure()?;
    let addr = config.addr()?;

    let state = Arc::new(AppState::new(&workspace));
    seed_default_prompts(&state.prompts)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, workspace = %workspace.root().display(), "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body as HttpBody;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    pub struct TestApp {
        pub _dir: tempfile::TempDir,
        pub app: Router,
    }

    pub fn app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(&Workspace::new(dir.path())));
        TestApp { app: router(state), _dir: dir }
    }

    impl TestApp {
        pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let (status, bytes) = self.send_raw(method, uri, body).await;
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        pub async fn send_raw(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(HttpBody::from(json.to_string()))
                    .unwrap(),
                None => builder.body(HttpBody::empty()).unwrap(),
            };
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
            (status, bytes)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::GET, uri, None).await
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::POST, uri, Some(body)).await
        }

        pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::PUT, uri, Some(body)).await
        }

        pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::DELETE, uri, None).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn health_is_enveloped() {
        let t = app();
        let (status, body) = t.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
        assert!(body["error"].is_null());
    }

    #[tokio::test]
    async fn unknown_route_is_enveloped_404() {
        let t = app();
        let (status, body) = t.get("/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn malformed_body_is_enveloped_400() {
        let t = app();
        let (status, body) = t.post("/api/projects", json!(["not", "an", "object"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}
