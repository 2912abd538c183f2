use axum::{extract::State, response::Response};
use mongodb::bson::Bson;
use serde_json::Value;
use std::sync::Arc;

use super::{respond, success_body};
use crate::db::{Collection, DocumentStore, StoreError};
use crate::error::ApiError;
use crate::models::AppState;
use crate::utils::{id_variants, shape_document};

pub async fn list_patients_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(list_patients(state.store.as_ref()).await, "listing patients")
}

/// Every patient, each carrying its appointments, or `"N/A"` when it has none.
pub async fn list_patients(store: &dyn DocumentStore) -> Result<Value, ApiError> {
    let patients = store.find_all(Collection::Patient).await?;
    let mut listed = Vec::with_capacity(patients.len());

    for mut patient in patients {
        let id = patient
            .get_object_id("_id")
            .map_err(|_| StoreError::Shape("patient without an ObjectId".to_string()))?;
        let appointments = store
            .find_by_field(Collection::Appointment, "patient_id", &id_variants(&id))
            .await?;

        let appointments = if appointments.is_empty() {
            Bson::String("N/A".to_string())
        } else {
            Bson::Array(appointments.into_iter().map(Bson::Document).collect())
        };
        patient.insert("appointments", appointments);
        listed.push(shape_document(patient));
    }

    Ok(success_body([("patients", Value::Array(listed))]))
}
