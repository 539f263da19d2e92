use crate::auth::basic_auth_ok;
use crate::domain::{StatusUpdate, UpsertResponse, VehicleInput};
use crate::error::{ApiError, ApiJson, ErrorResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use persister::UpsertOutcome;
use std::sync::Arc;
use tracing::{info, instrument};

/// Rejects admin requests without the configured Basic credentials.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !basic_auth_ok(&headers, &state.admin.user, &state.admin.password) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

#[utoipa::path(
    put,
    path = "/api/admin/vehicles/{inventory_number}",
    tag = "admin",
    params(
        ("inventory_number" = String, Path, description = "The dealer inventory number")
    ),
    request_body = VehicleInput,
    responses(
        (status = 201, description = "Vehicle created", body = UpsertResponse),
        (status = 200, description = "Vehicle replaced", body = UpsertResponse),
        (status = 400, description = "Invalid vehicle", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin credentials", body = ErrorResponse)
    ),
    security(("basic" = []))
)]
#[instrument(skip(state, input))]
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    Path(inventory_number): Path<String>,
    ApiJson(input): ApiJson<VehicleInput>,
) -> Result<(StatusCode, Json<UpsertResponse>), ApiError> {
    let vehicle = input
        .into_new_vehicle(inventory_number.clone())
        .map_err(ApiError::BadRequest)?;
    let outcome = state.persister.upsert_vehicle(vehicle).await?;
    info!(?outcome, "admin upserted vehicle");

    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };
    Ok((status, Json(UpsertResponse::new(inventory_number, outcome))))
}

#[utoipa::path(
    patch,
    path = "/api/admin/vehicles/{inventory_number}/status",
    tag = "admin",
    params(
        ("inventory_number" = String, Path, description = "The dealer inventory number")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 204, description = "Status changed"),
        (status = 404, description = "Unknown inventory number", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin credentials", body = ErrorResponse)
    ),
    security(("basic" = []))
)]
#[instrument(skip(state, update))]
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(inventory_number): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<StatusCode, ApiError> {
    let changed = state
        .persister
        .set_status(&inventory_number, update.status, Utc::now().naive_utc())
        .await?;
    if !changed {
        return Err(ApiError::VehicleNotFound(inventory_number));
    }
    info!(status = %update.status, "admin changed vehicle status");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/admin/vehicles/{inventory_number}",
    tag = "admin",
    params(
        ("inventory_number" = String, Path, description = "The dealer inventory number")
    ),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 404, description = "Unknown inventory number", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin credentials", body = ErrorResponse)
    ),
    security(("basic" = []))
)]
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(inventory_number): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.persister.delete_vehicle(&inventory_number).await? {
        return Err(ApiError::VehicleNotFound(inventory_number));
    }
    info!("admin deleted vehicle");
    Ok(StatusCode::NO_CONTENT)
}
