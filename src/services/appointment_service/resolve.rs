use mongodb::bson::{oid::ObjectId, Bson, Document};

use crate::db::{Collection, DocumentStore, StoreError};
use crate::models::name_field;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedIds {
    pub patient_id: Option<ObjectId>,
    pub doctor_id: Option<ObjectId>,
}

/// Looks both names up in the patient and the doctor collections, taking the
/// first id recorded under each name. A missing name never matches.
pub async fn resolve_ids(
    store: &dyn DocumentStore,
    patient_name: Option<&str>,
    doctor_name: Option<&str>,
) -> Result<ResolvedIds, StoreError> {
    let names: Vec<String> = patient_name
        .into_iter()
        .chain(doctor_name)
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Ok(ResolvedIds::default());
    }

    let patients = store.first_ids_by_name(Collection::Patient, &names).await?;
    let doctors = store.first_ids_by_name(Collection::Doctor, &names).await?;

    Ok(ResolvedIds {
        patient_id: patient_name.and_then(|name| patients.get(name).copied()),
        doctor_id: doctor_name.and_then(|name| doctors.get(name).copied()),
    })
}

/// Writes `patient_id` and `doctor_id` onto the appointment, as null when the
/// corresponding name did not resolve.
pub async fn attach_resolved_ids(
    store: &dyn DocumentStore,
    appointment: &mut Document,
) -> Result<ResolvedIds, StoreError> {
    let patient_name = name_field(appointment, "patient_name");
    let doctor_name = name_field(appointment, "doctor_name");
    let ids = resolve_ids(store, patient_name.as_deref(), doctor_name.as_deref()).await?;

    appointment.insert("patient_id", ids.patient_id.map_or(Bson::Null, Bson::ObjectId));
    appointment.insert("doctor_id", ids.doctor_id.map_or(Bson::Null, Bson::ObjectId));
    Ok(ids)
}
