use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::{Client, Database};
use std::collections::HashMap;

use super::{Collection, DocumentStore, RecordQuery, StoreError};

/// MongoDB-backed store. The client is opened once and shared by every request.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(MongoStore {
            db: client.database(database),
        })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(collection.name())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection(collection)
            .find_one(query.to_filter())
            .await?)
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        values: &[Bson],
    ) -> Result<Vec<Document>, StoreError> {
        let mut filter = Document::new();
        filter.insert(field, doc! { "$in": values.to_vec() });
        let cursor = self.collection(collection).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn first_ids_by_name(
        &self,
        collection: Collection,
        names: &[String],
    ) -> Result<HashMap<String, ObjectId>, StoreError> {
        let pipeline = vec![
            doc! { "$match": { "name": { "$in": names.to_vec() } } },
            doc! { "$group": { "_id": "$name", "id": { "$first": "$_id" } } },
        ];
        let groups: Vec<Document> = self
            .collection(collection)
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        let mut ids = HashMap::new();
        for group in groups {
            // Only string names can match the `$in` list above.
            let (Ok(name), Ok(id)) = (group.get_str("_id"), group.get_object_id("id")) else {
                return Err(StoreError::Shape(format!(
                    "unexpected name group in {}: {}",
                    collection.name(),
                    group
                )));
            };
            ids.insert(name.to_string(), id);
        }
        Ok(ids)
    }

    async fn find_appointment_between(
        &self,
        doctor_refs: &[Bson],
        from: bson::DateTime,
        to: bson::DateTime,
    ) -> Result<Option<Document>, StoreError> {
        let filter = doc! {
            "doctor_id": { "$in": doctor_refs.to_vec() },
            "appointment_time": { "$gte": from, "$lte": to },
        };
        Ok(self
            .collection(Collection::Appointment)
            .find_one(filter)
            .await?)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let result = self.collection(collection).insert_one(document).await?;
        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(StoreError::Shape(format!(
                "inserted id in {} is not an ObjectId: {}",
                collection.name(),
                other
            ))),
        }
    }

    async fn update_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
        set: Document,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .update_one(query.to_filter(), doc! { "$set": set })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(query.to_filter())
            .await?;
        Ok(result.deleted_count)
    }
}
