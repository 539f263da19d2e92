use crate::auth::{offered_secret, secret_eq};
use crate::domain::{CleanupQuery, CleanupResponse};
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use persister::sweep::{MAX_RETENTION_DAYS, purge_sold};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[utoipa::path(
    post,
    path = "/api/cleanup-sold",
    tag = "cleanup",
    params(CleanupQuery),
    responses(
        (status = 200, description = "Sweep finished", body = CleanupResponse),
        (status = 400, description = "Retention window out of range", body = ErrorResponse),
        (status = 401, description = "Secret configured but not offered", body = ErrorResponse),
        (status = 500, description = "Listing the expired vehicles failed", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn cleanup_sold(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<CleanupQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let Query(query) = query?;

    match &state.cleanup.secret {
        Some(expected) => {
            let offered = offered_secret(&headers, query.secret.as_deref());
            if !offered.is_some_and(|secret| secret_eq(secret, expected)) {
                warn!("cleanup called without a valid secret");
                return Err(ApiError::Unauthorized);
            }
        }
        None => warn!("cleanup secret not configured, endpoint is open"),
    }

    let retention_days = query.retention_days.unwrap_or(state.cleanup.retention_days);
    if retention_days > MAX_RETENTION_DAYS {
        return Err(ApiError::BadRequest(format!(
            "retention_days must not exceed {MAX_RETENTION_DAYS}"
        )));
    }
    let report = purge_sold(
        state.persister.as_ref(),
        Duration::days(i64::from(retention_days)),
        Utc::now().naive_utc(),
    )
    .await?;

    info!(retention_days, ?report, "cleanup finished");
    Ok(Json(CleanupResponse::new(report, retention_days)))
}
