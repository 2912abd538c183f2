use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::AppState;
use crate::services::{
    add_record_handler, assign_nurse_handler, delete_record_handler, doctor_login_handler,
    find_nurse_from_doctor_handler, get_record_info_handler, list_appointments_handler,
    list_departments_handler, list_patients_handler, list_records_handler,
    set_appointment_handler, update_appointment_handler, update_record_handler, Doctor, Nurse,
    Patient,
};

pub fn router(shared_state: Arc<AppState>) -> Router {
    Router::new()
        // appointments
        .route("/appointment", get(list_appointments_handler))
        .route("/appointment/", get(list_appointments_handler))
        .route("/appointment/add", post(set_appointment_handler))
        .route("/appointment/update", put(update_appointment_handler))
        // patients
        .route("/patients", get(list_patients_handler))
        .route("/patients/", get(list_patients_handler))
        .route("/patients/add", post(add_record_handler::<Patient>))
        .route(
            "/patients/get_patient_info",
            post(get_record_info_handler::<Patient>),
        )
        .route("/patients/update", put(update_record_handler::<Patient>))
        .route("/patients/delete", delete(delete_record_handler::<Patient>))
        // doctors
        .route("/doctor", get(list_records_handler::<Doctor>))
        .route("/doctor/", get(list_records_handler::<Doctor>))
        .route("/doctor/add", post(add_record_handler::<Doctor>))
        .route("/doctor/login", post(doctor_login_handler))
        .route(
            "/doctor/get_doctor_info",
            post(get_record_info_handler::<Doctor>),
        )
        .route("/doctor/update", put(update_record_handler::<Doctor>))
        .route("/doctor/delete", delete(delete_record_handler::<Doctor>))
        .route("/doctor/assign_nurse", put(assign_nurse_handler))
        // nurses
        .route("/nurse", get(list_records_handler::<Nurse>))
        .route("/nurse/", get(list_records_handler::<Nurse>))
        .route("/nurse/add", post(add_record_handler::<Nurse>))
        .route(
            "/nurse/get_nurse_info",
            post(get_record_info_handler::<Nurse>),
        )
        .route("/nurse/update", put(update_record_handler::<Nurse>))
        .route("/nurse/delete", delete(delete_record_handler::<Nurse>))
        // extras
        .route(
            "/extra/find_nurse_from_doctor",
            post(find_nurse_from_doctor_handler),
        )
        .route("/department", get(list_departments_handler))
        .route("/department/", get(list_departments_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}
