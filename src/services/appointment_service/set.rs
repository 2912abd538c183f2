use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use mongodb::bson::Bson;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::collision::{doctor_refs, has_collision};
use super::resolve::attach_resolved_ids;
use crate::db::{Collection, DocumentStore};
use crate::error::ApiError;
use crate::models::{AppState, AppointmentResponse, NewAppointment};
use crate::utils::shape_document;

pub async fn set_appointment_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewAppointment>, JsonRejection>,
) -> impl IntoResponse {
    let result = match payload {
        Ok(Json(payload)) => insert_appointment(state.store.as_ref(), payload).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    match result {
        Ok(appointment) => {
            Json(AppointmentResponse::success("Appointment added", appointment)).into_response()
        }
        Err(e) if e.status_code().is_client_error() => {
            warn!("Rejected appointment: {}", e);
            e.into_response()
        }
        Err(e) => {
            error!("Error creating appointment: {}", e);
            e.into_response()
        }
    }
}

/// Validates, collision-checks, resolves and stores a new appointment, and
/// returns the response-shaped document.
pub async fn insert_appointment(
    store: &dyn DocumentStore,
    payload: NewAppointment,
) -> Result<Value, ApiError> {
    let appointment_time = payload.parse_time()?;
    let mut appointment = payload.into_document(appointment_time)?;

    let refs = doctor_refs(appointment.get("doctor_id"));
    if has_collision(store, &refs, appointment_time).await? {
        return Err(ApiError::Collision);
    }

    attach_resolved_ids(store, &mut appointment).await?;
    let id = store
        .insert_one(Collection::Appointment, appointment.clone())
        .await?;
    info!("Appointment {} created", id);

    appointment.insert("_id", id);
    // The response names the doctor `doctorName`; the stored field stays `doctor_name`.
    let doctor_name = appointment.remove("doctor_name").unwrap_or(Bson::Null);
    appointment.insert("doctorName", doctor_name);

    Ok(shape_document(appointment))
}
