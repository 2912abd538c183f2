use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use mongodb::bson::doc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::db::{Collection, DocumentStore, RecordQuery};
use crate::error::ApiError;
use crate::models::{AppState, AssignNurseParams, RecordLookup};
use crate::services::records_service::{respond, success_body};

pub async fn assign_nurse_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssignNurseParams>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(params)) => assign_nurse(state.store.as_ref(), params).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "assigning nurse")
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Stores the matching nurse's id, as a string, in the doctor's `nurse_id`.
pub async fn assign_nurse(
    store: &dyn DocumentStore,
    params: AssignNurseParams,
) -> Result<Value, ApiError> {
    let doctor = RecordLookup {
        name: present(params.name),
        id: present(params.object_id),
        email: None,
    };
    if !doctor.has_name_or_id() {
        return Err(ApiError::BadRequest(
            "Doctor name or ObjectId not provided".to_string(),
        ));
    }
    let nurse_query = RecordQuery {
        name: present(params.nurse_name),
        id: None,
        email: present(params.nurse_email),
    };
    if nurse_query == RecordQuery::default() {
        return Err(ApiError::BadRequest(
            "Nurse name or email not provided".to_string(),
        ));
    }

    let nurse = store
        .find_one(Collection::Nurse, &nurse_query)
        .await?
        .ok_or_else(|| ApiError::NotFound("Nurse not found".to_string()))?;
    let nurse_id = nurse
        .get_object_id("_id")
        .map_err(|_| ApiError::NotFound("Nurse not found".to_string()))?
        .to_hex();

    let matched = store
        .update_one(
            Collection::Doctor,
            &doctor.to_query(false)?,
            doc! { "nurse_id": nurse_id.as_str() },
        )
        .await?;
    info!("Nurse {} assigned to {} doctor(s)", nurse_id, matched);

    Ok(success_body([(
        "message",
        Value::from("Nurse assigned to doctor"),
    )]))
}
