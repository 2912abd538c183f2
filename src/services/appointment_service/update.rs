use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use mongodb::bson::{doc, oid::ObjectId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::collision::{doctor_refs, has_collision};
use super::resolve::attach_resolved_ids;
use crate::db::{to_bson_datetime, Collection, DocumentStore, RecordQuery};
use crate::error::ApiError;
use crate::models::{AppState, AppointmentResponse, AppointmentUpdate};
use crate::utils::shape_document;

pub async fn update_appointment_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AppointmentUpdate>, JsonRejection>,
) -> impl IntoResponse {
    let result = match payload {
        Ok(Json(payload)) => reschedule_appointment(state.store.as_ref(), payload).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    match result {
        Ok(appointment) => Json(AppointmentResponse::success(
            "Appointment time updated",
            appointment,
        ))
        .into_response(),
        Err(e) if e.status_code().is_client_error() => {
            warn!("Rejected appointment update: {}", e);
            e.into_response()
        }
        Err(e) => {
            error!("Error updating appointment: {}", e);
            e.into_response()
        }
    }
}

/// Runs the same validation and resolution as a create, but persists only the
/// new `appointment_time`. The returned document reflects the whole payload.
pub async fn reschedule_appointment(
    store: &dyn DocumentStore,
    payload: AppointmentUpdate,
) -> Result<Value, ApiError> {
    let AppointmentUpdate {
        appointment_id,
        appointment: payload,
    } = payload;

    let appointment_time = payload.parse_time()?;
    let appointment_id = appointment_id.ok_or(ApiError::MissingField("appointment_id"))?;
    let id = ObjectId::parse_str(&appointment_id)
        .map_err(|_| ApiError::InvalidId(appointment_id.clone()))?;
    let mut appointment = payload.into_document(appointment_time)?;

    let refs = doctor_refs(appointment.get("doctor_id"));
    if has_collision(store, &refs, appointment_time).await? {
        return Err(ApiError::Collision);
    }

    attach_resolved_ids(store, &mut appointment).await?;

    let matched = store
        .update_one(
            Collection::Appointment,
            &RecordQuery::by_id(id),
            doc! { "appointment_time": to_bson_datetime(appointment_time) },
        )
        .await?;
    if matched == 0 {
        warn!("No appointment {} to reschedule", appointment_id);
    } else {
        info!("Appointment {} rescheduled", appointment_id);
    }

    appointment.insert("appointment_id", appointment_id.as_str());
    appointment.insert("_id", appointment_id);
    Ok(shape_document(appointment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::appointment_service::set::insert_appointment;
    use serde_json::json;

    async fn booked(store: &MemoryStore, doctor: &ObjectId, time: &str) -> ObjectId {
        let created = insert_appointment(
            store,
            serde_json::from_value(json!({
                "doctor_id": doctor.to_hex(),
                "appointment_time": time,
                "patient_name": "Ana",
                "doctor_name": "Dr. Grey",
                "room": "1A",
            }))
            .unwrap(),
        )
        .await
        .unwrap();
        ObjectId::parse_str(created["_id"].as_str().unwrap()).unwrap()
    }

    fn update(id: &ObjectId, doctor: &ObjectId, time: &str) -> AppointmentUpdate {
        serde_json::from_value(json!({
            "appointment_id": id.to_hex(),
            "doctor_id": doctor.to_hex(),
            "appointment_time": time,
            "patient_name": "Someone Else",
            "doctor_name": "Dr. Grey",
            "room": "9Z",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn only_the_time_is_persisted() {
        let store = MemoryStore::new();
        let doctor = store
            .insert_one(Collection::Doctor, doc! { "name": "Dr. Grey" })
            .await
            .unwrap();
        let id = booked(&store, &doctor, "2024-01-01 10:00:00").await;

        let response = reschedule_appointment(&store, update(&id, &doctor, "2024-01-01 12:00:00"))
            .await
            .unwrap();
        assert_eq!(response["_id"], json!(id.to_hex()));
        assert_eq!(response["room"], json!("9Z"));
        assert_eq!(response["patient_name"], json!("Someone Else"));
        assert_eq!(response["doctor_id"], json!(doctor.to_hex()));

        let stored = store
            .find_one(Collection::Appointment, &RecordQuery::by_id(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_str("room").unwrap(), "1A");
        assert_eq!(stored.get_str("patient_name").unwrap(), "Ana");
        assert_eq!(
            shape_document(stored)["appointment_time"],
            json!("2024-01-01 12:00:00")
        );
    }

    #[tokio::test]
    async fn resubmitting_the_same_time_collides_with_itself() {
        let store = MemoryStore::new();
        let doctor = store
            .insert_one(Collection::Doctor, doc! { "name": "Dr. Grey" })
            .await
            .unwrap();
        let id = booked(&store, &doctor, "2024-01-01 10:00:00").await;

        let err = reschedule_appointment(&store, update(&id, &doctor, "2024-01-01 10:00:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Collision));
    }

    #[tokio::test]
    async fn unknown_appointment_is_a_silent_no_op() {
        let store = MemoryStore::new();
        let ghost = ObjectId::new();
        let response =
            reschedule_appointment(&store, update(&ghost, &ObjectId::new(), "2024-05-05 09:00:00"))
                .await
                .unwrap();
        assert_eq!(response["_id"], json!(ghost.to_hex()));
        assert!(store.find_all(Collection::Appointment).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_or_missing_id_is_rejected() {
        let store = MemoryStore::new();
        let mut payload = update(&ObjectId::new(), &ObjectId::new(), "2024-05-05 09:00:00");
        payload.appointment_id = Some("xyz".to_string());
        let err = reschedule_appointment(&store, payload.clone()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidId(_)));

        payload.appointment_id = None;
        let err = reschedule_appointment(&store, payload).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingField("appointment_id")));
    }

    #[tokio::test]
    async fn missing_id_is_reported_before_a_taken_slot() {
        let store = MemoryStore::new();
        let doctor = store
            .insert_one(Collection::Doctor, doc! { "name": "Dr. Grey" })
            .await
            .unwrap();
        let id = booked(&store, &doctor, "2024-01-01 10:00:00").await;

        let mut payload = update(&id, &doctor, "2024-01-01 10:05:00");
        payload.appointment_id = None;
        let err = reschedule_appointment(&store, payload).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingField("appointment_id")));
    }
}
