use crate::domain::model::{IterationsResponse, ProjectId, ProjectsResponse};
use crate::http::AppState;
use crate::utils::error::{MetricsError, Result};
use axum::body::Body;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub iterations: Option<u64>,
}

pub async fn healthz_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn projects_handler(State(state): State<AppState>) -> Result<Json<ProjectsResponse>> {
    let projects = state.store.list_projects().await?;
    Ok(Json(ProjectsResponse { projects }))
}

/// 路徑段無法解碼（例如非 UTF-8）時也算是無效的專案名稱
async fn resolve_project(
    state: &AppState,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<ProjectId> {
    let Path(project) = path.map_err(|e| MetricsError::InvalidProject {
        name: "<undecodable>".to_string(),
        reason: e.body_text(),
    })?;
    state.store.validate_project(&project).await
}

pub async fn iterations_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<IterationsResponse>> {
    let project = resolve_project(&state, path).await?;
    let iterations = state.store.list_iterations(&project).await?;
    Ok(Json(IterationsResponse { iterations }))
}

pub async fn metrics_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
    query: std::result::Result<Query<MetricsQuery>, QueryRejection>,
) -> Result<Response> {
    // 先確認專案，再看查詢參數
    let project = resolve_project(&state, path).await?;
    let Query(query) = query.map_err(|e| MetricsError::InvalidQuery {
        message: e.body_text(),
    })?;
    let iteration = query.iterations.unwrap_or(state.default_iterations);

    let file = state.store.fetch_metrics(&project, iteration).await?;
    tracing::debug!("Serving {}/{} ({} bytes)", project, file.file_name, file.len);

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    let body = Body::from_stream(ReaderStream::new(file.file));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, file.len.to_string()),
        ],
        body,
    )
        .into_response())
}
