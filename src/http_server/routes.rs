//! Import HTTP Routes
//!
//! - `POST  /imports`
//! - `PATCH /imports/:import_id/citizens/:citizen_id`
//! - `GET   /imports/:import_id/citizens`
//! - `GET   /imports/:import_id/citizens/birthdays`
//! - `GET   /imports/:import_id/towns/stat/percentile/age`
//! - `GET   /health`
//!
//! Service calls run on the blocking pool. Once spawned they finish even if
//! the client goes away, so relative edits are never cut short.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::Span;

use crate::schema::Citizen;
use crate::service::{Birthdays, ImportService, ServiceResult, TownAgeStats};

use super::errors::{ApiError, ApiResult};
use super::response::{DataResponse, HealthResponse, ImportCreated};

/// Shared handler state
pub type ImportState = Arc<ImportService>;

/// Create import routes
pub fn import_routes(service: ImportState) -> Router {
    Router::new()
        .route("/imports", post(create_import))
        .route("/imports/:import_id/citizens", get(list_citizens))
        .route("/imports/:import_id/citizens/birthdays", get(birthdays))
        .route(
            "/imports/:import_id/citizens/:citizen_id",
            patch(update_citizen),
        )
        .route(
            "/imports/:import_id/towns/stat/percentile/age",
            get(age_percentiles),
        )
        .with_state(service)
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::ok()))
}

/// Runs `f` against the service on the blocking pool, inside the request span.
async fn run_blocking<T, F>(service: &ImportState, f: F) -> ApiResult<T>
where
    F: FnOnce(&ImportService) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(service);
    let span = Span::current();
    let result = tokio::task::spawn_blocking(move || span.in_scope(|| f(&service)))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(result?)
}

async fn create_import(
    State(service): State<ImportState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let import_id = run_blocking(&service, move |s| s.create_import(&body)).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ImportCreated { import_id })),
    ))
}

async fn update_citizen(
    State(service): State<ImportState>,
    path: Result<Path<(u64, u64)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Citizen>>> {
    let Path((import_id, citizen_id)) = path?;
    let Json(body) = body?;
    let citizen = run_blocking(&service, move |s| {
        s.update_citizen(import_id, citizen_id, &body)
    })
    .await?;
    Ok(Json(DataResponse::new(citizen)))
}

async fn list_citizens(
    State(service): State<ImportState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<DataResponse<Vec<Citizen>>>> {
    let Path(import_id) = path?;
    let citizens = run_blocking(&service, move |s| s.citizens(import_id)).await?;
    Ok(Json(DataResponse::new(citizens)))
}

async fn birthdays(
    State(service): State<ImportState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<DataResponse<Birthdays>>> {
    let Path(import_id) = path?;
    let birthdays = run_blocking(&service, move |s| s.birthdays(import_id)).await?;
    Ok(Json(DataResponse::new(birthdays)))
}

async fn age_percentiles(
    State(service): State<ImportState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<DataResponse<Vec<TownAgeStats>>>> {
    let Path(import_id) = path?;
    let stats = run_blocking(&service, move |s| s.age_percentiles(import_id)).await?;
    Ok(Json(DataResponse::new(stats)))
}
