use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::{ok, ApiResult, Params, SharedState};
use crate::analytics::{DashboardSummary, TimelineDataPoint};
use crate::error::Error;
use crate::validation::validate_period;

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/projects/:id/analytics/summary", get(summary))
        .route("/api/projects/:id/analytics/timeline", get(timeline))
        .route("/api/projects/:id/analytics/export", get(export))
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

async fn summary(State(state): State<SharedState>, Path(project_id): Path<String>) -> ApiResult<DashboardSummary> {
    ok(state.analytics.summary(&project_id)?)
}

async fn timeline(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
    Params(query): Params<TimelineQuery>,
) -> ApiResult<Vec<TimelineDataPoint>> {
    let period = validate_period(query.period.as_deref())?;
    ok(state.analytics.timeline(&project_id, period)?)
}

/// Raw CSV download; not wrapped in the JSON envelope.
async fn export(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
    Params(query): Params<ExportQuery>,
) -> Result<Response, Error> {
    let format = query.format.as_deref().unwrap_or("csv");
    if format != "csv" {
        return Err(Error::validation(format!(
            "Unsupported format: {format}. Only 'csv' is currently supported."
        )));
    }

    let csv = state.analytics.export_csv(&project_id)?;
    let disposition = format!("attachment; filename=\"analytics-{project_id}.csv\"");
    Ok(([(CONTENT_TYPE, "text/csv".to_string()), (CONTENT_DISPOSITION, disposition)], csv).into_response())
}
