use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{respond, success_body, RecordKind};
use crate::db::DocumentStore;
use crate::error::ApiError;
use crate::models::{AppState, RecordLookup};
use crate::utils::{json_to_document, shape_document};

type Payload = Result<Json<Map<String, Value>>, JsonRejection>;

pub async fn list_records_handler<K: RecordKind>(State(state): State<Arc<AppState>>) -> Response {
    respond(list_records::<K>(state.store.as_ref()).await, "listing records")
}

pub async fn add_record_handler<K: RecordKind>(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Response {
    let result = match payload {
        Ok(Json(payload)) => add_record::<K>(state.store.as_ref(), payload).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "adding record")
}

pub async fn get_record_info_handler<K: RecordKind>(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Response {
    let result = match payload {
        Ok(Json(payload)) => get_record_info::<K>(state.store.as_ref(), payload).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "fetching record")
}

pub async fn update_record_handler<K: RecordKind>(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Response {
    let result = match payload {
        Ok(Json(payload)) => update_record::<K>(state.store.as_ref(), payload).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "updating record")
}

pub async fn delete_record_handler<K: RecordKind>(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Response {
    let result = match payload {
        Ok(Json(payload)) => delete_record::<K>(state.store.as_ref(), payload).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(result, "deleting record")
}

fn missing_keys<K: RecordKind>(with_email: bool) -> ApiError {
    if with_email {
        ApiError::BadRequest(format!("{} name or ObjectId or email not provided", K::LABEL))
    } else {
        ApiError::BadRequest(format!("{} name or ObjectId not provided", K::LABEL))
    }
}

fn not_found<K: RecordKind>() -> ApiError {
    ApiError::NotFound(format!("{} not found", K::LABEL))
}

/// Lookup used by info and delete: name or id, plus email where the kind
/// allows it.
fn selecting_lookup<K: RecordKind>(payload: &Map<String, Value>) -> Result<RecordLookup, ApiError> {
    let lookup = RecordLookup::from_payload(payload);
    let provided = if K::EMAIL_LOOKUP {
        lookup.has_any()
    } else {
        lookup.has_name_or_id()
    };
    if !provided {
        return Err(missing_keys::<K>(K::EMAIL_LOOKUP));
    }
    Ok(lookup)
}

pub async fn list_records<K: RecordKind>(store: &dyn DocumentStore) -> Result<Value, ApiError> {
    let records = store.find_all(K::COLLECTION).await?;
    let records = records.into_iter().map(shape_document).collect();
    Ok(success_body([(K::PLURAL, Value::Array(records))]))
}

pub async fn add_record<K: RecordKind>(
    store: &dyn DocumentStore,
    payload: Map<String, Value>,
) -> Result<Value, ApiError> {
    let mut record = json_to_document(payload)?;
    let id = store.insert_one(K::COLLECTION, record.clone()).await?;
    info!("{} {} added", K::LABEL, id);
    record.insert("_id", id);
    Ok(success_body([
        ("message", Value::from(format!("{} added", K::LABEL))),
        (K::KEY, shape_document(record)),
    ]))
}

pub async fn get_record_info<K: RecordKind>(
    store: &dyn DocumentStore,
    payload: Map<String, Value>,
) -> Result<Value, ApiError> {
    let query = selecting_lookup::<K>(&payload)?.to_query(K::EMAIL_LOOKUP)?;
    match store.find_one(K::COLLECTION, &query).await? {
        Some(record) => Ok(success_body([(K::KEY, shape_document(record))])),
        None => Err(not_found::<K>()),
    }
}

/// Selects by name or id and `$set`s the remaining payload fields. Reports
/// success whether or not a record matched.
pub async fn update_record<K: RecordKind>(
    store: &dyn DocumentStore,
    mut payload: Map<String, Value>,
) -> Result<Value, ApiError> {
    let lookup = RecordLookup::from_payload(&payload);
    if !lookup.has_name_or_id() {
        return Err(missing_keys::<K>(false));
    }
    let query = lookup.to_query(false)?;

    payload.remove("objectId");
    let changes = json_to_document(payload)?;
    if !changes.is_empty() {
        let matched = store.update_one(K::COLLECTION, &query, changes).await?;
        info!("{} update matched {} record(s)", K::LABEL, matched);
    }
    Ok(success_body([(
        "message",
        Value::from(format!("{} updated", K::LABEL)),
    )]))
}

pub async fn delete_record<K: RecordKind>(
    store: &dyn DocumentStore,
    payload: Map<String, Value>,
) -> Result<Value, ApiError> {
    let query = selecting_lookup::<K>(&payload)?.to_query(K::EMAIL_LOOKUP)?;
    if store.delete_one(K::COLLECTION, &query).await? == 1 {
        Ok(success_body([(
            "message",
            Value::from(format!("{} deleted", K::LABEL)),
        )]))
    } else {
        Err(not_found::<K>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Collection, MemoryStore, RecordQuery};
    use crate::services::records_service::{Doctor, Nurse, Patient};
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn added_records_come_back_with_string_ids() {
        let store = MemoryStore::new();
        let body = add_record::<Doctor>(
            &store,
            object(json!({ "name": "Dr. Grey", "email": "grey@clinic.org", "department": "ER" })),
        )
        .await
        .unwrap();
        assert_eq!(body["message"], json!("Doctor added"));
        let id = body["doctor"]["_id"].as_str().unwrap();
        assert!(ObjectId::parse_str(id).is_ok());

        let listed = list_records::<Doctor>(&store).await.unwrap();
        assert_eq!(listed["doctors"][0]["_id"], json!(id));
        assert_eq!(listed["doctors"][0]["department"], json!("ER"));
    }

    #[tokio::test]
    async fn info_requires_a_lookup_key_and_reports_missing_records() {
        let store = MemoryStore::new();
        let err = get_record_info::<Patient>(&store, object(json!({ "email": "x@y.z" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Patient name or ObjectId not provided");

        let err = get_record_info::<Nurse>(&store, object(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Nurse name or ObjectId or email not provided");

        let err = get_record_info::<Nurse>(&store, object(json!({ "email": "joy@clinic.org" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn doctors_can_be_found_by_email() {
        let store = MemoryStore::new();
        add_record::<Doctor>(&store, object(json!({ "name": "Dr. Grey", "email": "grey@clinic.org" })))
            .await
            .unwrap();
        let body = get_record_info::<Doctor>(&store, object(json!({ "email": "grey@clinic.org" })))
            .await
            .unwrap();
        assert_eq!(body["doctor"]["name"], json!("Dr. Grey"));
    }

    #[tokio::test]
    async fn update_sets_payload_fields_on_the_selected_record() {
        let store = MemoryStore::new();
        let added = add_record::<Patient>(&store, object(json!({ "name": "Ana", "age": 40 })))
            .await
            .unwrap();
        let id = added["patient"]["_id"].as_str().unwrap().to_string();

        update_record::<Patient>(&store, object(json!({ "_id": id, "age": 41, "ward": "B" })))
            .await
            .unwrap();
        let stored = store
            .find_one(
                Collection::Patient,
                &RecordQuery::by_id(ObjectId::parse_str(&id).unwrap()),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_i64("age").unwrap(), 41);
        assert_eq!(stored.get_str("ward").unwrap(), "B");
        assert_eq!(stored.get_object_id("_id").unwrap().to_hex(), id);
    }

    #[tokio::test]
    async fn delete_reports_missing_records() {
        let store = MemoryStore::new();
        add_record::<Nurse>(&store, object(json!({ "name": "Joy" })))
            .await
            .unwrap();

        let body = delete_record::<Nurse>(&store, object(json!({ "name": "Joy" })))
            .await
            .unwrap();
        assert_eq!(body["message"], json!("Nurse deleted"));

        let err = delete_record::<Nurse>(&store, object(json!({ "name": "Joy" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Nurse not found");
    }
}
