use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use crate::db::{Collection, DocumentStore};
use crate::error::ApiError;
use crate::models::{AppState, AppointmentListResponse};
use crate::utils::shape_document;

pub async fn list_appointments_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match list_appointments(state.store.as_ref()).await {
        Ok(appointments) => Json(AppointmentListResponse {
            status: "success",
            appointments,
        })
        .into_response(),
        Err(e) => {
            error!("Error listing appointments: {}", e);
            e.into_response()
        }
    }
}

pub async fn list_appointments(store: &dyn DocumentStore) -> Result<Vec<Value>, ApiError> {
    let appointments = store.find_all(Collection::Appointment).await?;
    Ok(appointments.into_iter().map(shape_document).collect())
}
