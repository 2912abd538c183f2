use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::RecordQuery;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignNurseParams {
    pub name: Option<String>,
    #[serde(rename = "objectId")]
    pub object_id: Option<String>,
    #[serde(rename = "nurseName")]
    pub nurse_name: Option<String>,
    #[serde(rename = "nurseEmail")]
    pub nurse_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FindNurseParams {
    #[serde(rename = "doctorName")]
    pub doctor_name: Option<String>,
}

/// Lookup keys pulled from a record payload. The id may arrive as `_id` or
/// `objectId`; empty strings count as absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordLookup {
    pub name: Option<String>,
    pub id: Option<String>,
    pub email: Option<String>,
}

fn non_empty(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl RecordLookup {
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        RecordLookup {
            name: non_empty(payload, "name"),
            id: non_empty(payload, "_id").or_else(|| non_empty(payload, "objectId")),
            email: non_empty(payload, "email"),
        }
    }

    pub fn has_name_or_id(&self) -> bool {
        self.name.is_some() || self.id.is_some()
    }

    pub fn has_any(&self) -> bool {
        self.has_name_or_id() || self.email.is_some()
    }

    /// The store query for these keys; `with_email` controls whether the email
    /// takes part in the match.
    pub fn to_query(&self, with_email: bool) -> Result<RecordQuery, ApiError> {
        let id = match &self.id {
            Some(raw) => {
                Some(ObjectId::parse_str(raw).map_err(|_| ApiError::InvalidId(raw.clone()))?)
            }
            None => None,
        };
        Ok(RecordQuery {
            name: self.name.clone(),
            id,
            email: if with_email { self.email.clone() } else { None },
        })
    }
}
