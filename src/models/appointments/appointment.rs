use chrono::NaiveDateTime;
use mongodb::bson::{self, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::to_bson_datetime;
use crate::error::ApiError;
use crate::utils::WIRE_TIME_FORMAT;

// "YYYY-MM-DD HH:MM:SS", digits everywhere except the separators.
const WIRE_TIME_SHAPE: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";

/// Parses the fixed appointment wire format. Chrono alone accepts single-digit
/// fields and signed years, so the shape is checked first.
pub fn parse_appointment_time(raw: &str) -> Result<NaiveDateTime, ApiError> {
    let shape_ok = raw.len() == WIRE_TIME_SHAPE.len()
        && raw
            .bytes()
            .zip(WIRE_TIME_SHAPE.iter())
            .all(|(b, &expected)| match expected {
                b'd' => b.is_ascii_digit(),
                sep => b == sep,
            });
    if !shape_ok {
        return Err(ApiError::InvalidTimestamp(raw.to_string()));
    }
    NaiveDateTime::parse_from_str(raw, WIRE_TIME_FORMAT)
        .map_err(|_| ApiError::InvalidTimestamp(raw.to_string()))
}

/// Body of `POST /appointment/add`. The fields the scheduler reads are named
/// but kept as raw JSON, so a wrongly typed value is judged by the scheduler
/// instead of failing deserialization. The rest are carried through to the
/// stored document untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    #[serde(default)]
    pub doctor_id: Option<Value>,
    #[serde(default)]
    pub appointment_time: Option<Value>,
    #[serde(default)]
    pub patient_name: Option<Value>,
    #[serde(default)]
    pub doctor_name: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewAppointment {
    pub fn parse_time(&self) -> Result<NaiveDateTime, ApiError> {
        match &self.appointment_time {
            Some(Value::String(raw)) => parse_appointment_time(raw),
            Some(other) => Err(ApiError::InvalidTimestamp(other.to_string())),
            None => Err(ApiError::MissingField("appointment_time")),
        }
    }

    /// The payload as a store document, with the parsed time in place of the
    /// raw string. A caller-supplied `_id` is dropped so the store assigns one.
    /// Names that are not strings are kept as sent and never resolve.
    pub fn into_document(self, appointment_time: NaiveDateTime) -> Result<Document, ApiError> {
        let mut document = Document::new();
        for (key, value) in self.extra {
            if key == "_id" {
                continue;
            }
            document.insert(key, bson::to_bson(&value)?);
        }
        let named = [
            ("doctor_id", self.doctor_id),
            ("patient_name", self.patient_name),
            ("doctor_name", self.doctor_name),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                document.insert(key, bson::to_bson(&value)?);
            }
        }
        document.insert("appointment_time", to_bson_datetime(appointment_time));
        Ok(document)
    }
}

/// Body of `PUT /appointment/update`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(flatten)]
    pub appointment: NewAppointment,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub appointment: Value,
}

impl AppointmentResponse {
    pub fn success(message: &'static str, appointment: Value) -> Self {
        AppointmentResponse {
            status: "success",
            message,
            appointment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub status: &'static str,
    pub appointments: Vec<Value>,
}

/// Display name lookups read from a document being written.
pub fn name_field(document: &Document, key: &str) -> Option<String> {
    match document.get(key) {
        Some(Bson::String(name)) => Some(name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_parses() {
        let t = parse_appointment_time("2024-01-01 10:05:00").unwrap();
        assert_eq!(t.format(WIRE_TIME_FORMAT).to_string(), "2024-01-01 10:05:00");
    }

    #[test]
    fn non_conforming_times_are_rejected() {
        for raw in [
            "not-a-date",
            "2024-1-01 10:00:00",
            "2024-01-01T10:00:00",
            "2024-01-01 10:00",
            "2024-01-01 10:00:00+02:00",
            "+2024-01-01 10:00:00",
            "2024-02-30 10:00:00",
            "2024-01-01 24:00:00",
        ] {
            assert!(
                matches!(parse_appointment_time(raw), Err(ApiError::InvalidTimestamp(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn missing_time_is_a_validation_error() {
        let payload: NewAppointment = serde_json::from_value(json!({ "doctor_id": "d1" })).unwrap();
        assert!(matches!(
            payload.parse_time(),
            Err(ApiError::MissingField("appointment_time"))
        ));
    }

    #[test]
    fn non_string_times_are_a_validation_error() {
        for time in [json!(20240101), json!(true), json!(["2024-01-01 10:00:00"])] {
            let payload: NewAppointment =
                serde_json::from_value(json!({ "appointment_time": time })).unwrap();
            assert!(matches!(
                payload.parse_time(),
                Err(ApiError::InvalidTimestamp(_))
            ));
        }
    }

    #[test]
    fn caller_ids_and_odd_names_do_not_break_the_document() {
        let payload: NewAppointment = serde_json::from_value(json!({
            "_id": "abc",
            "appointment_time": "2024-01-01 10:00:00",
            "patient_name": 42,
        }))
        .unwrap();
        let time = payload.parse_time().unwrap();
        let document = payload.into_document(time).unwrap();

        assert!(document.get("_id").is_none());
        assert_eq!(document.get("patient_name"), Some(&Bson::Int64(42)));
        assert_eq!(name_field(&document, "patient_name"), None);
    }

    #[test]
    fn passthrough_fields_survive_into_the_document() {
        let payload: NewAppointment = serde_json::from_value(json!({
            "doctor_id": "d1",
            "appointment_time": "2024-01-01 10:00:00",
            "patient_name": "Ana",
            "doctor_name": "Dr. Grey",
            "status": "booked",
            "notes": { "reason": "checkup", "priority": 2 },
        }))
        .unwrap();
        let time = payload.parse_time().unwrap();
        let document = payload.into_document(time).unwrap();

        assert_eq!(document.get_str("status").unwrap(), "booked");
        assert_eq!(
            document.get_document("notes").unwrap().get_str("reason").unwrap(),
            "checkup"
        );
        assert_eq!(document.get_str("doctor_name").unwrap(), "Dr. Grey");
        assert!(matches!(
            document.get("appointment_time"),
            Some(Bson::DateTime(_))
        ));
    }

    #[test]
    fn update_payload_carries_appointment_fields() {
        let payload: AppointmentUpdate = serde_json::from_value(json!({
            "appointment_id": "65a000000000000000000001",
            "appointment_time": "2024-01-01 11:00:00",
            "doctor_name": "Dr. Grey",
        }))
        .unwrap();
        assert_eq!(
            payload.appointment_id.as_deref(),
            Some("65a000000000000000000001")
        );
        assert_eq!(payload.appointment.doctor_name, Some(json!("Dr. Grey")));
        assert!(payload.appointment.extra.is_empty());
    }
}
