use crate::domain::{VehicleDto, VehicleQuery};
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use persister::VehicleFilter;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/vehicles",
    tag = "vehicles",
    params(VehicleQuery),
    responses(
        (status = 200, description = "Returns matching vehicles, most recently updated first", body = [VehicleDto]),
        (status = 400, description = "Returns an error for malformed query parameters", body = ErrorResponse)
    )
)]
pub async fn all(
    State(state): State<Arc<AppState>>,
    query: Result<Query<VehicleQuery>, QueryRejection>,
) -> Result<Json<Vec<VehicleDto>>, ApiError> {
    let Query(query) = query?;
    let filter = VehicleFilter::from(query);
    let vehicles = state.persister.list_vehicles(&filter).await?;
    Ok(Json(vehicles.into_iter().map(VehicleDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/vehicles/{inventory_number}",
    tag = "vehicles",
    params(
        ("inventory_number" = String, Path, description = "The dealer inventory number")
    ),
    responses(
        (status = 200, description = "Returns a vehicle", body = VehicleDto),
        (status = 404, description = "Returns an error when the inventory number does not exist", body = ErrorResponse)
    )
)]
pub async fn by_inventory_number(
    Path(inventory_number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VehicleDto>, ApiError> {
    let vehicle = state
        .persister
        .find_vehicle(&inventory_number)
        .await?
        .ok_or(ApiError::VehicleNotFound(inventory_number))?;
    Ok(Json(vehicle.into()))
}
