// src/db/mod.rs

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Document encoding error: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("Unexpected document shape: {0}")]
    Shape(String),
}

/// The collections the service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Patient,
    Doctor,
    Nurse,
    Appointment,
    Department,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Patient => "patient",
            Collection::Doctor => "doctor",
            Collection::Nurse => "nurse",
            Collection::Appointment => "appointment",
            Collection::Department => "department",
        }
    }
}

/// Conjunctive equality filter over the natural lookup keys of a record.
/// An empty query matches any document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub name: Option<String>,
    pub id: Option<ObjectId>,
    pub email: Option<String>,
}

impl RecordQuery {
    pub fn by_id(id: ObjectId) -> Self {
        RecordQuery {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        RecordQuery {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn to_filter(&self) -> Document {
        let mut filter = doc! {};
        if let Some(name) = &self.name {
            filter.insert("name", name.as_str());
        }
        if let Some(id) = &self.id {
            filter.insert("_id", *id);
        }
        if let Some(email) = &self.email {
            filter.insert("email", email.as_str());
        }
        filter
    }

    pub fn matches(&self, document: &Document) -> bool {
        let field_is = |key: &str, expected: Bson| document.get(key) == Some(&expected);
        self.name
            .as_ref()
            .map_or(true, |name| field_is("name", Bson::String(name.clone())))
            && self.id.map_or(true, |id| field_is("_id", Bson::ObjectId(id)))
            && self
                .email
                .as_ref()
                .map_or(true, |email| field_is("email", Bson::String(email.clone())))
    }
}

/// Naive wall-clock time stored as a BSON datetime, read as if it were UTC.
pub fn to_bson_datetime(time: NaiveDateTime) -> bson::DateTime {
    bson::DateTime::from_millis(time.and_utc().timestamp_millis())
}

pub fn from_bson_datetime(time: bson::DateTime) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(time.timestamp_millis()).map(|t| t.naive_utc())
}

/// The document-store operations the service issues.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, unfiltered.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<Option<Document>, StoreError>;

    /// Documents whose `field` equals any of `values`.
    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        values: &[Bson],
    ) -> Result<Vec<Document>, StoreError>;

    /// Records whose `name` is one of `names`, grouped by name, keeping the
    /// first id seen for each name.
    async fn first_ids_by_name(
        &self,
        collection: Collection,
        names: &[String],
    ) -> Result<HashMap<String, ObjectId>, StoreError>;

    /// Any appointment whose `doctor_id` is one of `doctor_refs` and whose
    /// `appointment_time` lies in `[from, to]`, both bounds inclusive.
    async fn find_appointment_between(
        &self,
        doctor_refs: &[Bson],
        from: bson::DateTime,
        to: bson::DateTime,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError>;

    /// Applies `$set` to the first match; returns the matched count.
    async fn update_one(
        &self,
        collection: Collection,
        query: &RecordQuery,
        set: Document,
    ) -> Result<u64, StoreError>;

    /// Removes the first match; returns the deleted count.
    async fn delete_one(&self, collection: Collection, query: &RecordQuery)
        -> Result<u64, StoreError>;
}

pub async fn connect(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.store_backend {
        StoreBackend::Mongo => {
            let store = MongoStore::connect(&config.mongo_uri, &config.mongo_database).await?;
            info!(
                "Connected to MongoDB database {} at {}",
                config.mongo_database, config.mongo_uri
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
