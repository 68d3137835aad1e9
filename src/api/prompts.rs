use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use super::{created, ok, ApiResult, Body, Params, SharedState};
use crate::fields::PromptCategory;
use crate::template::{CreatePromptDto, PromptTemplate, PromptVersion, UpdatePromptDto};
use crate::validation::validate_prompt_category;
use crate::variables::PromptValidationResult;

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/prompts", get(list).post(create))
        .route("/api/prompts/categories", get(categories))
        .route("/api/prompts/:id", get(fetch).put(update).delete(remove))
        .route("/api/prompts/:id/reset", post(reset))
        .route("/api/prompts/:id/versions", get(versions))
        .route("/api/prompts/:id/validate", post(validate))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest {
    #[serde(default)]
    variable_values: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    id: String,
    deleted: bool,
}

async fn categories() -> ApiResult<[PromptCategory; 4]> {
    ok(PromptCategory::ALL)
}

async fn list(State(state): State<SharedState>, Params(query): Params<ListQuery>) -> ApiResult<Vec<PromptTemplate>> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| validate_prompt_category(Some(c)))
        .transpose()?;
    ok(state.prompts.list(category)?)
}

async fn create(State(state): State<SharedState>, Body(dto): Body<CreatePromptDto>) -> ApiResult<PromptTemplate> {
    let _guard = state.write_lock.lock().await;
    created(state.prompts.create(dto)?)
}

async fn fetch(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<PromptTemplate> {
    ok(state.prompts.require(&id)?)
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(dto): Body<UpdatePromptDto>,
) -> ApiResult<PromptTemplate> {
    let _guard = state.write_lock.lock().await;
    ok(state.prompts.update(&id, dto)?)
}

async fn remove(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let _guard = state.write_lock.lock().await;
    state.prompts.delete(&id)?;
    ok(Deleted { id, deleted: true })
}

async fn reset(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<PromptTemplate> {
    let _guard = state.write_lock.lock().await;
    ok(state.prompts.reset(&id)?)
}

async fn versions(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Vec<PromptVersion>> {
    state.prompts.require(&id)?;
    ok(state.prompts.versions(&id)?)
}

async fn validate(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(req): Body<ValidateRequest>,
) -> ApiResult<PromptValidationResult> {
    ok(state.prompts.validate(&id, &req.variable_values)?)
}
