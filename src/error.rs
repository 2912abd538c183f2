// src/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid appointment_time '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid record id '{0}'")]
    InvalidId(String),
    #[error("Appointment collides with existing appointment for the doctor")]
    Collision,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Malformed payload: {0}")]
    Payload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidTimestamp(_) | ApiError::MissingField(_) | ApiError::InvalidId(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Collision | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Payload(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Payload(rejection.body_text())
    }
}

impl From<mongodb::bson::ser::Error> for ApiError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        ApiError::Payload(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}
