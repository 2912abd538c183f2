use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;

use crate::db::{Collection, DocumentStore, RecordQuery};
use crate::error::ApiError;
use crate::models::{AppState, FindNurseParams};
use crate::services::records_service::{respond, success_body};
use crate::utils::shape_document;

pub async fn find_nurse_from_doctor_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FindNurseParams>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(params)) => find_nurse_from_doctor(state.store.as_ref(), params).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "finding assigned nurse")
}

/// The named doctor together with the nurse recorded in its `nurse_id`.
pub async fn find_nurse_from_doctor(
    store: &dyn DocumentStore,
    params: FindNurseParams,
) -> Result<Value, ApiError> {
    let Some(doctor_name) = params.doctor_name.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("Doctor name not provided".to_string()));
    };

    let doctor_query = RecordQuery {
        name: Some(doctor_name),
        ..Default::default()
    };
    let doctor = store
        .find_one(Collection::Doctor, &doctor_query)
        .await?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".to_string()))?;

    let nurse_id = match doctor.get_str("nurse_id") {
        Ok(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(ApiError::NotFound(
                "No nurse assigned to this doctor".to_string(),
            ))
        }
    };
    let nurse_id = ObjectId::parse_str(&nurse_id).map_err(|_| ApiError::InvalidId(nurse_id))?;

    let nurse = store
        .find_one(Collection::Nurse, &RecordQuery::by_id(nurse_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Nurse not found".to_string()))?;

    Ok(success_body([
        ("doctor", shape_document(doctor)),
        ("assigned_nurse", shape_document(nurse)),
    ]))
}
