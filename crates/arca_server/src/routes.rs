//! HTTP surface over the reconciliation cache.
//!
//! # Invariants
//! - Every handler runs under the configured request timeout; expiry drops
//!   the in-flight work.
//! - Any failure is a 500 with the error text as a plain body.

use arca_core::{CoreResult, Spreadsheet, Table};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    pub spreadsheet: Arc<Spreadsheet>,
    pub request_timeout: Duration,
}

pub struct ServerError(String);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        warn!("event=http_error module=server status=error error={}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/all", get(read_all))
        .route("/api/v1/read_all", get(read_all))
        .route("/api/v1/areas", get(read_areas).post(upload_areas))
        .route("/api/v1/materials", get(read_materials).post(upload_materials))
        .route("/api/v1/areas_materials", get(read_area_materials))
        .route("/api/v1/areas_keys", get(read_area_keys))
        .route(
            "/api/v1/areas_relations",
            get(read_relations).post(upload_relations),
        )
        .route("/api/v1/reset", post(reset))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn within<T, F>(timeout: Duration, work: F) -> Result<T, ServerError>
where
    F: Future<Output = CoreResult<T>>,
{
    match tokio::time::timeout(timeout, work).await {
        Ok(result) => result.map_err(|err| ServerError(err.to_string())),
        Err(_) => Err(ServerError(format!(
            "request timed out after {} ms",
            timeout.as_millis()
        ))),
    }
}

/// Renders one table, or all of them when `table` is `None`.
async fn read(state: &AppState, table: Option<Table>) -> Result<Response, ServerError> {
    let spreadsheet = &state.spreadsheet;
    let body = within(state.request_timeout, async {
        let mut body = Vec::new();
        match table {
            None => spreadsheet.read_all_to(&mut body).await,
            Some(Table::Areas) => spreadsheet.read_areas_to(&mut body).await,
            Some(Table::Materials) => spreadsheet.read_materials_to(&mut body).await,
            Some(Table::AreaMaterials) => spreadsheet.read_area_materials_to(&mut body).await,
            Some(Table::AreaKeys) => spreadsheet.read_area_keys_to(&mut body).await,
            Some(Table::Relations) => spreadsheet.read_relations_to(&mut body).await,
        }?;
        Ok(body)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn read_all(State(state): State<AppState>) -> Result<Response, ServerError> {
    read(&state, None).await
}

async fn read_areas(State(state): State<AppState>) -> Result<Response, ServerError> {
    read(&state, Some(Table::Areas)).await
}

async fn read_materials(State(state): State<AppState>) -> Result<Response, ServerError> {
    read(&state, Some(Table::Materials)).await
}

async fn read_area_materials(State(state): State<AppState>) -> Result<Response, ServerError> {
    read(&state, Some(Table::AreaMaterials)).await
}

async fn read_area_keys(State(state): State<AppState>) -> Result<Response, ServerError> {
    read(&state, Some(Table::AreaKeys)).await
}

async fn read_relations(State(state): State<AppState>) -> Result<Response, ServerError> {
    read(&state, Some(Table::Relations)).await
}

async fn upload_areas(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ServerError> {
    within(
        state.request_timeout,
        state.spreadsheet.upload_areas_from(body.as_ref()),
    )
    .await?;
    Ok(StatusCode::OK)
}

async fn upload_materials(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    within(
        state.request_timeout,
        state.spreadsheet.upload_materials_from(body.as_ref()),
    )
    .await?;
    Ok(StatusCode::OK)
}

async fn upload_relations(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    within(
        state.request_timeout,
        state.spreadsheet.upload_relations_from(body.as_ref()),
    )
    .await?;
    Ok(StatusCode::OK)
}

async fn reset(State(state): State<AppState>) -> StatusCode {
    state.spreadsheet.reset_data();
    StatusCode::OK
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    info!(
        "event=http_request module=server status={} method={} path={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        started.elapsed().as_millis()
    );
    response
}
