use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use super::{created, ok, ApiResult, SharedState};
use crate::task::{Archive, Task};

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/projects/:id/archives", get(list))
        .route("/api/projects/:id/archives/:archive_id", get(fetch).delete(remove))
        .route("/api/projects/:id/archives/:archive_id/restore", post(restore))
        .route("/api/projects/:id/tasks/:task_id/archive", post(archive))
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

async fn list(State(state): State<SharedState>, Path(project_id): Path<String>) -> ApiResult<Vec<Archive>> {
    ok(state.archives.list(&project_id)?)
}

async fn fetch(
    State(state): State<SharedState>,
    Path((project_id, archive_id)): Path<(String, String)>,
) -> ApiResult<Archive> {
    ok(state.archives.get(&project_id, &archive_id)?)
}

async fn archive(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> ApiResult<Archive> {
    let _guard = state.write_lock.lock().await;
    created(state.archives.archive(&project_id, &task_id)?)
}

async fn restore(
    State(state): State<SharedState>,
    Path((project_id, archive_id)): Path<(String, String)>,
) -> ApiResult<Task> {
    let _guard = state.write_lock.lock().await;
    ok(state.archives.restore(&project_id, &archive_id)?)
}

async fn remove(
    State(state): State<SharedState>,
    Path((project_id, archive_id)): Path<(String, String)>,
) -> ApiResult<Deleted> {
    let _guard = state.write_lock.lock().await;
    state.archives.delete(&project_id, &archive_id)?;
    ok(Deleted { deleted: true })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::api::test_support::app;

    #[tokio::test]
    async fn archive_restore_delete() {
        let t = app();
        let (_, body) = t.post("/api/projects", json!({"name": "Skyforge"})).await;
        let pid = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = t.post(&format!("/api/projects/{pid}/tasks"), json!({"title": "Docks"})).await;
        let tid = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = t.post(&format!("/api/projects/{pid}/tasks/{tid}/archive"), Value::Null).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only prototype tasks can be archived");

        t.put(&format!("/api/tasks/{tid}/status"), json!({"status": "prototype"})).await;
        let (status, body) = t.post(&format!("/api/projects/{pid}/tasks/{tid}/archive"), Value::Null).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["task"]["isArchived"], true);
        let aid = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = t.get(&format!("/api/projects/{pid}/tasks")).await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (status, body) = t.post(&format!("/api/projects/{pid}/archives/{aid}/restore"), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isArchived"], false);
        let (_, body) = t.get(&format!("/api/projects/{pid}/tasks")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        t.post(&format!("/api/projects/{pid}/tasks/{tid}/archive"), Value::Null).await;
        let (_, body) = t.get(&format!("/api/projects/{pid}/archives")).await;
        let aid = body["data"][0]["id"].as_str().unwrap().to_string();
        let (status, _) = t.get(&format!("/api/projects/{pid}/archives/{aid}")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = t.delete(&format!("/api/projects/{pid}/archives/{aid}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);
        let (status, body) = t.get(&format!("/api/projects/{pid}/archives/{aid}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Archive not found");
    }
}
