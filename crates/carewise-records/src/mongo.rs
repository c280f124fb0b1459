use crate::error::Result;
use crate::models::{HealthRecord, NewHealthRecord};
use crate::store::RecordStore;
use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

const COLLECTION: &str = "health_records";

/// MongoDB-backed record store. One document per submitted record.
#[derive(Clone)]
pub struct MongoRecordStore {
    collection: Collection<HealthRecord>,
}

impl MongoRecordStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection(COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn create(&self, user_id: &str, record: NewHealthRecord) -> Result<HealthRecord> {
        let now = Utc::now();
        let record = HealthRecord {
            id: ObjectId::new(),
            user_id: user_id.to_string(),
            heart_rate: record.heart_rate,
            spo2: record.spo2,
            temperature: record.temperature,
            blood_pressure: record.blood_pressure,
            symptoms: record.symptoms,
            created_at: now,
            updated_at: now,
        };

        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    async fn find_by_id(&self, user_id: &str, record_id: &str) -> Result<Option<HealthRecord>> {
        // An unparseable id cannot name any record
        let Ok(object_id) = ObjectId::parse_str(record_id) else {
            return Ok(None);
        };

        let filter = doc! { "_id": object_id, "user_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    async fn find_latest_for_user(&self, user_id: &str) -> Result<Option<HealthRecord>> {
        let filter = doc! { "user_id": user_id };
        let mut cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .limit(1)
            .await?;

        Ok(cursor.try_next().await?)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HealthRecord>> {
        let filter = doc! { "user_id": user_id };
        let records = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?;

        Ok(records)
    }
}
