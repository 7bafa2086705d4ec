//! Application handlers: create, list, read, update, delete, stats, plus the
//! liveness and health endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use applylog_core::{
    backend::StoreBackend,
    error::ApplicationError,
    page::{PageParams, DEFAULT_LIMIT},
    record::{ApplicationFields, ApplicationPatch, ApplicationRecord, ApplicationStats, ListFilter},
};

use super::{error::ApiError, state::AppState};

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Serialize)]
pub struct CreatedBody {
    pub id: String,
}

#[derive(Serialize)]
pub struct UpdatedBody {
    pub id: String,
    pub updated: bool,
}

#[derive(Serialize)]
pub struct DeletedBody {
    pub id: String,
    pub deleted: bool,
}

/// Decodes a JSON body into `T`. Malformed JSON and schema violations both
/// surface as validation errors.
fn decode_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = body.map_err(|rejection| ApplicationError::Validation(rejection.body_text()))?;
    serde_json::from_value(value)
        .map_err(|e| ApiError::from(ApplicationError::Validation(e.to_string())))
}

fn query_number(params: &HashMap<String, String>, name: &str, default: u64) -> Result<u64, ApiError> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::from(ApplicationError::Validation(format!(
                "{name} must be a non-negative integer, got '{raw}'"
            )))
        }),
    }
}

fn path_id(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(id)
}

fn not_found(id: &str) -> ApiError {
    ApplicationError::NotFound(id.to_string()).into()
}

pub async fn root() -> Json<MessageBody> {
    Json(MessageBody {
        message: "Job Application Tracker API is running",
    })
}

pub async fn health<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
) -> (StatusCode, Json<HealthBody>) {
    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthBody { status: "ok", database: "ok" }),
        ),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody { status: "degraded", database: "unavailable" }),
            )
        }
    }
}

pub async fn create<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let fields: ApplicationFields = decode_body(body)?;
    fields.validate()?;

    let id = state.repository.create(fields).await?;
    info!(%id, "application created");

    Ok((StatusCode::CREATED, Json(CreatedBody { id })))
}

pub async fn list<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<ApplicationRecord>>, ApiError> {
    let Query(params) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let filter = ListFilter {
        category: params.get("category").map(|raw| raw.parse()).transpose()?,
        status: params.get("status").map(|raw| raw.parse()).transpose()?,
    };
    let page = PageParams::builder()
        .with_skip(query_number(&params, "skip", 0)?)
        .with_limit(query_number(&params, "limit", DEFAULT_LIMIT)?)
        .build();
    page.validate(state.max_page_size)?;

    Ok(Json(state.repository.list(filter, page).await?))
}

pub async fn stats<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
) -> Result<Json<ApplicationStats>, ApiError> {
    Ok(Json(state.repository.aggregate_stats().await?))
}

pub async fn read<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ApplicationRecord>, ApiError> {
    let id = path_id(path)?;
    state
        .repository
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

pub async fn update<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdatedBody>, ApiError> {
    let id = path_id(path)?;
    let patch: ApplicationPatch = decode_body(body)?;
    if patch.is_empty() {
        return Err(ApplicationError::NothingToUpdate.into());
    }
    patch.validate()?;

    if state.repository.get_by_id(&id).await?.is_none() {
        return Err(not_found(&id));
    }
    if !state.repository.update(&id, &patch).await? {
        return Err(ApplicationError::StorageOperationFailed(format!(
            "update of {id} was not applied"
        ))
        .into());
    }
    info!(%id, "application updated");

    Ok(Json(UpdatedBody { id, updated: true }))
}

pub async fn delete<B: StoreBackend + 'static>(
    State(state): State<AppState<B>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeletedBody>, ApiError> {
    let id = path_id(path)?;
    if state.repository.get_by_id(&id).await?.is_none() {
        return Err(not_found(&id));
    }
    if !state.repository.delete(&id).await? {
        return Err(ApplicationError::StorageOperationFailed(format!(
            "delete of {id} was not applied"
        ))
        .into());
    }
    info!(%id, "application deleted");

    Ok(Json(DeletedBody { id, deleted: true }))
}
