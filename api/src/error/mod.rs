use axum::extract::FromRequest;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mobilox::error::FeedError;
use persister::error::PersisterError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("persister error: `{0}`")]
    Persister(#[from] PersisterError),
    #[error("vehicle with given inventory number not found: `{0}`")]
    VehicleNotFound(String),
    #[error("missing or invalid credentials")]
    Unauthorized,
    #[error("invalid request: `{0}`")]
    BadRequest(String),
    #[error("invalid json body: `{0}`")]
    Json(#[from] JsonRejection),
    #[error("invalid query: `{0}`")]
    Query(#[from] QueryRejection),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Persister(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::VehicleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Json(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::Persister(e) => {
                error!(persister_error = ?e, "request failed");
                "Something went wrong".to_string()
            }
            Self::VehicleNotFound(inventory_number) => format!(
                "vehicle with inventory number not found: `{}`",
                inventory_number
            ),
            Self::Json(rejection) => rejection.body_text(),
            Self::Query(rejection) => rejection.body_text(),
            other => other.to_string(),
        };

        (status, ApiJson(ErrorResponse { message })).into_response()
    }
}

/// Failure of a feed webhook call. The provider only reads the status code and a `0` body.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("missing or invalid feed credentials")]
    Unauthorized,
    #[error("body is not utf-8")]
    Encoding,
    #[error("feed error: `{0}`")]
    Feed(#[from] FeedError),
    #[error("persister error: `{0}`")]
    Persister(#[from] PersisterError),
}

impl ImportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Encoding | Self::Feed(_) => StatusCode::BAD_REQUEST,
            Self::Persister(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub(crate) struct ErrorResponse {
    message: String,
}

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub T);

impl<T> IntoResponse for ApiJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
