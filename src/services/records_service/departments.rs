use axum::{extract::State, response::Response};
use serde_json::Value;
use std::sync::Arc;

use super::{respond, success_body};
use crate::db::{Collection, DocumentStore};
use crate::error::ApiError;
use crate::models::AppState;
use crate::utils::shape_document;

pub async fn list_departments_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(list_departments(state.store.as_ref()).await, "listing departments")
}

pub async fn list_departments(store: &dyn DocumentStore) -> Result<Value, ApiError> {
    let departments = store.find_all(Collection::Department).await?;
    let departments = departments.into_iter().map(shape_document).collect();
    Ok(success_body([("departments", Value::Array(departments))]))
}
