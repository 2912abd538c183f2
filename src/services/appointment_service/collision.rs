use chrono::{NaiveDateTime, TimeDelta};
use mongodb::bson::{oid::ObjectId, Bson};

use crate::db::{to_bson_datetime, DocumentStore, StoreError};
use crate::utils::id_variants;

/// Half-width, in minutes, of the protected interval around an appointment.
pub const COLLISION_WINDOW_MINUTES: i64 = 10;

/// The values a stored `doctor_id` may hold for the doctor a caller named.
/// Resolved ids are stored natively while callers send the hex string, so a
/// parseable id matches either form. An absent id matches appointments whose
/// doctor never resolved.
pub fn doctor_refs(doctor_id: Option<&Bson>) -> Vec<Bson> {
    match doctor_id {
        None | Some(Bson::Null) => vec![Bson::Null],
        Some(Bson::ObjectId(id)) => id_variants(id),
        Some(Bson::String(raw)) => match ObjectId::parse_str(raw) {
            Ok(id) => id_variants(&id),
            Err(_) => vec![Bson::String(raw.clone())],
        },
        Some(other) => vec![other.clone()],
    }
}

/// True when the doctor already has an appointment within the window on
/// either side of `at`, bounds included. The appointment being rescheduled is
/// not excluded.
pub async fn has_collision(
    store: &dyn DocumentStore,
    doctor_refs: &[Bson],
    at: NaiveDateTime,
) -> Result<bool, StoreError> {
    let window = TimeDelta::minutes(COLLISION_WINDOW_MINUTES);
    let from = to_bson_datetime(at - window);
    let to = to_bson_datetime(at + window);
    Ok(store
        .find_appointment_between(doctor_refs, from, to)
        .await?
        .is_some())
}
