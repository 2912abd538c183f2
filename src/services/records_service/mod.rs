// src/services/records_service/mod.rs

pub mod crud;
pub mod departments;
pub mod patients;

use axum::{response::IntoResponse, Json};
use serde_json::{Map, Value};
use tracing::error;

use crate::db::Collection;
use crate::error::ApiError;

pub use crud::{
    add_record_handler, delete_record_handler, get_record_info_handler, list_records_handler,
    update_record_handler,
};
pub use departments::list_departments_handler;
pub use patients::list_patients_handler;

/// A profile collection served by the generic CRUD handlers.
pub trait RecordKind: Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Capitalised name used in messages.
    const LABEL: &'static str;
    /// Response key for a single record.
    const KEY: &'static str;
    /// Response key for a listing.
    const PLURAL: &'static str;
    /// Whether info and delete lookups may select by email.
    const EMAIL_LOOKUP: bool;
}

pub struct Patient;
pub struct Doctor;
pub struct Nurse;

impl RecordKind for Patient {
    const COLLECTION: Collection = Collection::Patient;
    const LABEL: &'static str = "Patient";
    const KEY: &'static str = "patient";
    const PLURAL: &'static str = "patients";
    const EMAIL_LOOKUP: bool = false;
}

impl RecordKind for Doctor {
    const COLLECTION: Collection = Collection::Doctor;
    const LABEL: &'static str = "Doctor";
    const KEY: &'static str = "doctor";
    const PLURAL: &'static str = "doctors";
    const EMAIL_LOOKUP: bool = true;
}

impl RecordKind for Nurse {
    const COLLECTION: Collection = Collection::Nurse;
    const LABEL: &'static str = "Nurse";
    const KEY: &'static str = "nurse";
    const PLURAL: &'static str = "nurses";
    const EMAIL_LOOKUP: bool = true;
}

/// `{"status": "success", ...entries}`
pub fn success_body<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("success"));
    for (key, value) in entries {
        body.insert(key.to_string(), value);
    }
    Value::Object(body)
}

/// Turns a service result into a response, logging server-side failures.
pub fn respond(result: Result<Value, ApiError>, action: &str) -> axum::response::Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            if e.status_code().is_server_error() {
                error!("Error {}: {}", action, e);
            }
            e.into_response()
        }
    }
}
