use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use serde::{Deserialize, Serialize};

use super::{created, ok, ApiResult, Body, SharedState};
use crate::task::{CreateTaskDto, Task, UpdateTaskDto};
use crate::validation::validate_status;

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/projects/:id/tasks", get(list).post(create))
        .route("/api/tasks/:id", put(update).delete(remove))
        .route("/api/tasks/:id/status", put(set_status))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

async fn list(State(state): State<SharedState>, Path(project_id): Path<String>) -> ApiResult<Vec<Task>> {
    ok(state.tasks.list(&project_id)?)
}

async fn create(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
    Body(dto): Body<CreateTaskDto>,
) -> ApiResult<Task> {
    let _guard = state.write_lock.lock().await;
    created(state.tasks.create(&project_id, dto)?)
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(dto): Body<UpdateTaskDto>,
) -> ApiResult<Task> {
    let _guard = state.write_lock.lock().await;
    ok(state.tasks.update(&id, dto)?)
}

async fn set_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(req): Body<StatusRequest>,
) -> ApiResult<Task> {
    let status = validate_status(req.status.as_deref())?;
    let _guard = state.write_lock.lock().await;
    ok(state.tasks.set_status(&id, status)?)
}

async fn remove(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let _guard = state.write_lock.lock().await;
    state.tasks.delete(&id)?;
    ok(Deleted { deleted: true })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{app, TestApp};

    async fn project(t: &TestApp) -> String {
        let (_, body) = t.post("/api/projects", json!({"name": "Skyforge"})).await;
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn task_lifecycle() {
        let t = app();
        let pid = project(&t).await;

        let (status, body) = t
            .post(&format!("/api/projects/{pid}/tasks"), json!({"title": "Crafting", "featureList": "- recipes"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "featurelist");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = t.put(&format!("/api/tasks/{id}/status"), json!({"status": "design"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "design");

        let (_, body) = t.put(&format!("/api/tasks/{id}"), json!({"designDocument": "# GDD"})).await;
        assert_eq!(body["data"]["designDocument"], "# GDD");
        assert_eq!(body["data"]["featureList"], "- recipes");

        let (_, body) = t.get(&format!("/api/projects/{pid}/tasks")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = t.delete(&format!("/api/tasks/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);
        let (status, _) = t.delete(&format!("/api/tasks/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_validation() {
        let t = app();
        let pid = project(&t).await;
        let (_, body) = t.post(&format!("/api/projects/{pid}/tasks"), json!({"title": "A"})).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = t.put(&format!("/api/tasks/{id}/status"), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "status is required");

        let (status, body) = t.put(&format!("/api/tasks/{id}/status"), json!({"status": "done"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid status: done. Must be one of: featurelist, design, prd, prototype");

        let (status, _) = t.put("/api/tasks/missing/status", json!({"status": "prd"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_requires_title_and_project() {
        let t = app();
        let pid = project(&t).await;
        let (status, body) = t.post(&format!("/api/projects/{pid}/tasks"), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title is required");

        let (status, _) = t.post("/api/projects/missing/tasks", json!({"title": "A"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
