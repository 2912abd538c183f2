use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Collection, DocumentStore, RecordQuery, StoreError};

/// In-process store with the same observable behaviour as `MongoStore` for the
/// operations the service issues. Documents keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// A missing field compares equal to null, as it does in a Mongo filter.
fn field_in(document: &Document, field: &str, values: &[Bson]) -> bool {
    let value = document.get(field).unwrap_or(&Bson::Null);
    values.contains(value)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|d| query.matches(d)).cloned()))
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        values: &[Bson],
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| field_in(d, field, values))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn first_ids_by_name(
        &self,
        collection: Collection,
        names: &[String],
    ) -> Result<HashMap<String, ObjectId>, StoreError> {
        let collections = self.collections.read().await;
        let mut ids = HashMap::new();
        for document in collections.get(&collection).into_iter().flatten() {
            let (Ok(name), Ok(id)) = (document.get_str("name"), document.get_object_id("_id"))
            else {
                continue;
            };
            if names.iter().any(|n| n == name) {
                ids.entry(name.to_string()).or_insert(id);
            }
        }
        Ok(ids)
    }

    async fn find_appointment_between(
        &self,
        doctor_refs: &[Bson],
        from: bson::DateTime,
        to: bson::DateTime,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&Collection::Appointment)
            .and_then(|documents| {
                documents.iter().find(|d| {
                    field_in(d, "doctor_id", doctor_refs)
                        && matches!(
                            d.get("appointment_time"),
                            Some(Bson::DateTime(t)) if *t >= from && *t <= to
                        )
                })
            })
            .cloned())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<ObjectId, StoreError> {
        let id = match document.get("_id").cloned() {
            Some(Bson::ObjectId(id)) => id,
            Some(other) => {
                return Err(StoreError::Shape(format!(
                    "only ObjectId identifiers are supported, got {}",
                    other
                )))
            }
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
        set: Document,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|d| query.matches(d)))
        else {
            return Ok(0);
        };
        for (key, value) in set {
            document.insert(key, value);
        }
        Ok(1)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        match documents.iter().position(|d| query.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::to_bson_datetime;
    use chrono::NaiveDateTime;
    use mongodb::bson::doc;

    fn at(s: &str) -> bson::DateTime {
        to_bson_datetime(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap())
    }

    #[tokio::test]
    async fn insert_assigns_object_id() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Patient, doc! { "name": "Ana" })
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Patient, &RecordQuery::by_id(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "Ana");
    }

    #[tokio::test]
    async fn first_id_wins_for_duplicate_names() {
        let store = MemoryStore::new();
        let first = store
            .insert_one(Collection::Doctor, doc! { "name": "Dr. Grey" })
            .await
            .unwrap();
        store
            .insert_one(Collection::Doctor, doc! { "name": "Dr. Grey" })
            .await
            .unwrap();

        let ids = store
            .first_ids_by_name(
                Collection::Doctor,
                &["Dr. Grey".to_string(), "Nobody".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids["Dr. Grey"], first);
    }

    #[tokio::test]
    async fn window_lookup_is_inclusive_and_scoped_to_doctor() {
        let store = MemoryStore::new();
        store
            .insert_one(
                Collection::Appointment,
                doc! { "doctor_id": "d1", "appointment_time": at("2024-01-01 10:00:00") },
            )
            .await
            .unwrap();

        let d1 = [Bson::String("d1".to_string())];
        let d2 = [Bson::String("d2".to_string())];
        let hit = store
            .find_appointment_between(&d1, at("2024-01-01 09:50:00"), at("2024-01-01 10:00:00"))
            .await
            .unwrap();
        assert!(hit.is_some());

        let miss = store
            .find_appointment_between(&d1, at("2024-01-01 10:00:01"), at("2024-01-01 10:20:00"))
            .await
            .unwrap();
        assert!(miss.is_none());

        let other_doctor = store
            .find_appointment_between(&d2, at("2024-01-01 09:50:00"), at("2024-01-01 10:10:00"))
            .await
            .unwrap();
        assert!(other_doctor.is_none());
    }

    #[tokio::test]
    async fn update_and_delete_report_counts() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Nurse, doc! { "name": "Joy", "ward": "A" })
            .await
            .unwrap();
        let by_name = RecordQuery {
            name: Some("Joy".to_string()),
            ..Default::default()
        };

        let matched = store
            .update_one(Collection::Nurse, &by_name, doc! { "ward": "B" })
            .await
            .unwrap();
        assert_eq!(matched, 1);
        let nurse = store
            .find_one(Collection::Nurse, &by_name)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(nurse.get_str("ward").unwrap(), "B");

        assert_eq!(store.delete_one(Collection::Nurse, &by_name).await.unwrap(), 1);
        assert_eq!(store.delete_one(Collection::Nurse, &by_name).await.unwrap(), 0);
    }
}
