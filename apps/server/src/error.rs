use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nestegg_core::errors::{DatabaseError, Error as CoreError, SavingsError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Savings(savings) => match savings {
            SavingsError::TargetNotFound { .. } => StatusCode::NOT_FOUND,
            SavingsError::TargetInactive { .. } => StatusCode::CONFLICT,
            SavingsError::InsufficientFunds { .. }
            | SavingsError::TransferExceedsSource { .. }
            | SavingsError::NegativeRemainingFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SavingsError::InvalidAssumptions(_) => StatusCode::BAD_REQUEST,
            SavingsError::NoDistributionTargets => StatusCode::INTERNAL_SERVER_ERROR,
        },
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        CoreError::Database(_) | CoreError::Repository(_) | CoreError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", msg);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
