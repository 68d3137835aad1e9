use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{created, ok, ApiResult, Body, Params, SharedState};
use crate::fields::TemplateCategory;
use crate::template::{CreateTemplateDto, Template, TemplateVariable, UpdateTemplateDto};
use crate::validation::validate_template_category;
use crate::variables;

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/templates", get(list).post(create))
        .route("/api/templates/categories", get(categories))
        .route("/api/templates/suggest-variables", post(suggest_variables))
        .route("/api/templates/:id", get(fetch).put(update).delete(remove))
        .route("/api/templates/:id/preview", get(preview))
        .route("/api/templates/:id/apply", post(apply))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    category: Option<String>,
    project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyRequest {
    #[serde(default)]
    variable_values: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SuggestRequest {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct Rendered {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Applied {
    content: String,
    applied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

async fn categories() -> ApiResult<[TemplateCategory; 3]> {
    ok(TemplateCategory::ALL)
}

async fn list(State(state): State<SharedState>, Params(query): Params<ListQuery>) -> ApiResult<Vec<Template>> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| validate_template_category(Some(c)))
        .transpose()?;
    ok(state.templates.list(category, query.project_id.as_deref())?)
}

async fn create(State(state): State<SharedState>, Body(dto): Body<CreateTemplateDto>) -> ApiResult<Template> {
    let _guard = state.write_lock.lock().await;
    created(state.templates.create(dto)?)
}

async fn fetch(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Template> {
    ok(state.templates.require(&id)?)
}

async fn preview(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Rendered> {
    ok(Rendered { content: state.templates.preview(&id)? })
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(dto): Body<UpdateTemplateDto>,
) -> ApiResult<Template> {
    let _guard = state.write_lock.lock().await;
    ok(state.templates.update(&id, dto)?)
}

async fn remove(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let _guard = state.write_lock.lock().await;
    state.templates.delete(&id)?;
    ok(Deleted { deleted: true })
}

async fn apply(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Body(req): Body<ApplyRequest>,
) -> ApiResult<Applied> {
    let content = state.templates.apply(&id, &req.variable_values)?;
    ok(Applied { content, applied_at: Utc::now() })
}

async fn suggest_variables(Body(req): Body<SuggestRequest>) -> ApiResult<Vec<TemplateVariable>> {
    ok(variables::suggest_variables(&req.content))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::app;
    use crate::db::Workspace;
    use crate::template::CreateTemplateDto;
    use crate::template_store::TemplateStore;

    #[tokio::test]
    async fn create_get_and_apply() {
        let t = app();
        let (status, body) = t
            .post(
                "/api/templates",
                json!({
                    "name": "Pitch",
                    "category": "document-structure",
                    "content": "# {{title}} for {{audience}}",
                    "variables": [
                        {"name": "title", "required": true},
                        {"name": "audience", "defaultValue": "players"}
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = t.get(&format!("/api/templates/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "# {{title}} for {{audience}}");
        assert_eq!(body["data"]["isDefault"], false);

        let (_, body) = t.get(&format!("/api/templates/{id}/preview")).await;
        assert_eq!(body["data"]["content"], "# [title] for players");

        let (status, body) = t.post(&format!("/api/templates/{id}/apply"), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required variables: title");

        let (status, body) = t
            .post(&format!("/api/templates/{id}/apply"), json!({"variableValues": {"title": "Quest"}}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "# Quest for players");
        assert!(body["data"]["appliedAt"].is_string());
    }

    #[tokio::test]
    async fn validation_failures_are_400() {
        let t = app();
        let (status, body) = t.post("/api/templates", json!({"category": "prompts"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name is required");

        let (status, _) = t.post("/api/templates", json!({"name": "x", "category": "bogus"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = t.get("/api/templates?category=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = t.get("/api/templates/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Template not found");
    }

    #[tokio::test]
    async fn moving_into_a_category_with_the_same_name_is_400() {
        let t = app();
        let (_, body) = t.post("/api/templates", json!({"name": "Intro", "category": "qa-questions"})).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        t.post("/api/templates", json!({"name": "Intro", "category": "prompts"})).await;

        let (status, body) = t.put(&format!("/api/templates/{id}"), json!({"category": "prompts"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, body) = t.get("/api/templates?category=prompts").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        let (_, body) = t.get(&format!("/api/templates/{id}")).await;
        assert_eq!(body["data"]["category"], "qa-questions");
    }

    #[tokio::test]
    async fn default_template_survives_delete() {
        let t = app();
        let store = TemplateStore::new(&Workspace::new(t._dir.path()));
        let default = store
            .create_default(CreateTemplateDto {
                name: Some("Core Q&A".into()),
                category: Some("qa-questions".into()),
                content: Some("What is the core loop?".into()),
                ..Default::default()
            })
            .unwrap();

        let (status, body) = t.delete(&format!("/api/templates/{}", default.id)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = t.get(&format!("/api/templates/{}", default.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "What is the core loop?");
    }

    #[tokio::test]
    async fn delete_and_list() {
        let t = app();
        let (_, body) = t
            .post("/api/templates", json!({"name": "Temp", "category": "prompts", "content": "x"}))
            .await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = t.get("/api/templates?category=prompts").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = t.delete(&format!("/api/templates/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);

        let (_, body) = t.get("/api/templates").await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn categories_and_suggestions() {
        let t = app();
        let (_, body) = t.get("/api/templates/categories").await;
        assert_eq!(body["data"], json!(["qa-questions", "document-structure", "prompts"]));

        let (status, body) = t
            .post("/api/templates/suggest-variables", json!({"content": "{{game_title}} {{genre}}"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "game_title");
        assert_eq!(body["data"][0]["description"], "Game Title");
        assert_eq!(body["data"][1]["name"], "genre");
    }
}
