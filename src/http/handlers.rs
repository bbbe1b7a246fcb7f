//! Request handlers
//!
//! Each handler decodes its input, runs one engine call on the blocking
//! pool, and turns the outcome into a response.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use super::payload::{CreateResponse, RecordPayload};
use super::{ApiError, AppState};
use crate::record::Record;

/// `GET /readyz`
pub async fn readyz() -> impl IntoResponse {
    tracing::debug!("Service is OK");
    ([(header::CONTENT_TYPE, "text/html")], "OK")
}

/// `POST /records`
pub async fn create_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let record = RecordPayload::parse(&body)?.into_record()?;

    let id = state.run(move |store| store.create(&record)).await?;

    tracing::debug!("Create record {} was successful", id);
    Ok((StatusCode::CREATED, Json(CreateResponse { id })))
}

/// `GET /records/{id}`
pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&raw_id)?;

    let record = state
        .run(move |store| store.get(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::debug!("Get record by id {} was successful", id);
    Ok(Json(record))
}

/// `PUT /records/{id}`
pub async fn edit_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    let record = RecordPayload::parse(&body)?.into_record()?;

    state
        .run(move |store| store.update(id, &record))
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::debug!("Edit record {} was successful", id);
    Ok(StatusCode::OK)
}

/// `DELETE /records/{id}`
pub async fn delete_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;

    if !state.run(move |store| store.delete(id)).await? {
        return Err(ApiError::NotFound);
    }

    tracing::debug!("Delete record {} was successful", id);
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_string()))
}
