use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use crate::db::from_bson_datetime;

pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Replaces every `ObjectId` in a nested value with its hex string.
/// Everything else is returned unchanged, so applying it twice is the same as once.
pub fn normalize_ids(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(id) => Bson::String(id.to_hex()),
        Bson::Document(document) => Bson::Document(normalize_document(document)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(normalize_ids).collect()),
        other => other,
    }
}

pub fn normalize_document(document: Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, normalize_ids(value)))
        .collect()
}

/// Both the native and the string form of an identifier, for matching fields
/// that may hold either.
pub fn id_variants(id: &ObjectId) -> Vec<Bson> {
    vec![Bson::ObjectId(*id), Bson::String(id.to_hex())]
}

/// Renders a store value as response JSON. Datetimes use the appointment wire
/// format; other store-specific types fall back to relaxed extended JSON.
pub fn to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::from(n),
        Bson::Int64(n) => Value::from(n),
        Bson::Double(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(time) => match from_bson_datetime(time) {
            Some(naive) => Value::String(naive.format(WIRE_TIME_FORMAT).to_string()),
            None => Bson::DateTime(time).into_relaxed_extjson(),
        },
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        Bson::Document(document) => document_to_json(document),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, to_json(value)))
            .collect::<Map<String, Value>>(),
    )
}

/// Converts a JSON object payload into a store document. A caller-supplied
/// `_id` is dropped so the store assigns a native one.
pub fn json_to_document(payload: Map<String, Value>) -> Result<Document, bson::ser::Error> {
    let mut document = Document::new();
    for (key, value) in payload {
        if key == "_id" {
            continue;
        }
        document.insert(key, bson::to_bson(&value)?);
    }
    Ok(document)
}

/// Id normalization followed by JSON rendering.
pub fn shape_document(document: Document) -> Value {
    document_to_json(normalize_document(document))
}
