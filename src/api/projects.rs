use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use super::{created, ok, ApiResult, Body, SharedState};
use crate::project::{CreateProjectDto, Project, UpdateProjectDto};

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/projects", get(list).post(create))
        .route("/api/projects/:id", get(fetch).put(update).delete(remove))
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

async fn list(State(state): State<SharedState>) -> ApiResult<Vec<Project>> {
    ok(state.projects.list()?)
}

async fn create(State(state): State<SharedState>, Body(dto): Body<CreateProjectDto>) -> ApiResult<Project> {
    let _guard = state.write_lock.lock().await;
    created(state.projects.create(dto)?)
}

async fn fetch(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Project> {
    ok(state.projects.require(&id)?)
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(dto): Body<UpdateProjectDto>,
) -> ApiResult<Project> {
    let _guard = state.write_lock.lock().await;
    ok(state.projects.update(&id, dto)?)
}

async fn remove(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let _guard = state.write_lock.lock().await;
    state.projects.delete(&id)?;
    ok(Deleted { deleted: true })
}
