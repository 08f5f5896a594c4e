//! Central error translator: every failure in the request path funnels into
//! `ApiError`, which renders the uniform `{success: false, ...}` envelope with
//! a fixed status code per error class.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// One entry per invalid request field.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation errors")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn internal(e: impl Into<anyhow::Error>) -> Self {
        Self::Internal(e.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error detail is only exposed outside of production-like environments.
/// Mirrors the `APP_ENV` convention: unset counts as development.
fn is_development() -> bool {
    match std::env::var("APP_ENV") {
        Ok(v) => v == "development",
        Err(_) => true,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors, detail) = match self {
            ApiError::Validation(fields) => ("validation errors".to_string(), fields, None),
            ApiError::Internal(e) => {
                error!(error = ?e, "internal server error");
                let detail = if is_development() { Some(format!("{:#}", e)) } else { None };
                ("internal server error".to_string(), Vec::new(), detail)
            }
            other => {
                warn!(status = %status, error = %other, "request failed");
                (other.to_string(), Vec::new(), None)
            }
        };
        let body = ErrorBody { success: false, message, errors, detail };
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        for (field, errs) in e.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.push(FieldError { field: field.to_string(), message });
            }
        }
        ApiError::Validation(fields)
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ApiError::BadRequest(msg),
            ModelError::Conflict(_) => ApiError::Conflict("duplicate entry".into()),
            ModelError::ForeignKey(_) => ApiError::BadRequest("foreign key constraint violation".into()),
            ModelError::Db(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Forbidden(msg) => ApiError::Forbidden(msg),
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::Db(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
            ServiceError::Model(me) => me.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::Conflict => ApiError::Conflict("user with this email already exists".into()),
            AuthError::NotFound => ApiError::NotFound("user not found".into()),
            // Never distinguish unknown email from wrong password
            AuthError::Unauthorized => ApiError::Unauthorized("invalid credentials".into()),
            AuthError::HashError(msg) | AuthError::TokenError(msg) | AuthError::Repository(msg) => {
                ApiError::Internal(anyhow::anyhow!(msg))
            }
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        ModelError::from_db_err(e).into()
    }
}
