use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{Collection, DocumentStore, RecordQuery};
use crate::error::ApiError;
use crate::models::{AppState, LoginParams};
use crate::services::records_service::{respond, success_body};
use crate::utils::shape_document;

pub async fn doctor_login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginParams>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(params)) => verify_doctor_credentials(state.store.as_ref(), params).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "logging in doctor")
}

/// Plain equality check of the submitted password against the stored one.
pub async fn verify_doctor_credentials(
    store: &dyn DocumentStore,
    params: LoginParams,
) -> Result<Value, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let (Some(email), Some(password)) = (params.email, params.password) else {
        return Err(invalid());
    };
    let Some(doctor) = store
        .find_one(Collection::Doctor, &RecordQuery::by_email(email.as_str()))
        .await?
    else {
        warn!("Login attempt for unknown doctor {}", email);
        return Err(invalid());
    };

    if doctor.get_str("password").ok() != Some(password.as_str()) {
        warn!("Rejected login for doctor {}", email);
        return Err(invalid());
    }

    info!("Doctor {} logged in", email);
    Ok(success_body([
        ("message", Value::from("Doctor logged in")),
        ("doctor", shape_document(doctor)),
    ]))
}
