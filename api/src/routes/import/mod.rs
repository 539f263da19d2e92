use crate::auth::basic_auth_ok;
use crate::error::ImportError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use persister::feed::{ImportOutcome, apply_entries};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Body the provider expects on success.
pub const ACCEPTED: &str = "1";
/// Body the provider expects on any failure.
pub const REJECTED: &str = "0";

#[utoipa::path(
    post,
    path = "/api/mobilox-import",
    tag = "feed",
    request_body(content = String, content_type = "application/xml", description = "Mobilox vehicle document"),
    responses(
        (status = 200, description = "Document applied", body = String, example = "1"),
        (status = 400, description = "Body is not a usable vehicle document", body = String, example = "0"),
        (status = 401, description = "Missing or wrong feed credentials", body = String, example = "0"),
        (status = 405, description = "Any method but POST", body = String, example = "0"),
        (status = 500, description = "Store failure", body = String, example = "0")
    ),
    security(("basic" = []))
)]
#[instrument(skip_all)]
pub async fn mobilox_import(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    match import(&state, &headers, &body).await {
        Ok(outcomes) => {
            info!(entries = outcomes.len(), ?outcomes, "mobilox document imported");
            (StatusCode::OK, ACCEPTED)
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                error!(import_error = ?e, "mobilox import failed");
            } else {
                warn!(import_error = %e, "mobilox import rejected");
            }
            (status, REJECTED)
        }
    }
}

pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, REJECTED)
}

async fn import(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Vec<ImportOutcome>, ImportError> {
    if !basic_auth_ok(headers, &state.feed.user, &state.feed.password) {
        return Err(ImportError::Unauthorized);
    }
    let xml = std::str::from_utf8(body).map_err(|_| ImportError::Encoding)?;
    let entries = mobilox::parse_feed(xml)?;
    let outcomes = apply_entries(
        state.persister.as_ref(),
        entries,
        state.feed.delete_mode,
        Utc::now().naive_utc(),
    )
    .await?;
    Ok(outcomes)
}
