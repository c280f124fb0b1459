use crate::error::{HistoryError, Result};
use crate::models::StoredMessage;
use crate::store::HistoryStore;
use crate::thread::{ThreadIdentity, ThreadKind, ThreadSelector};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Bson;
use chrono::{DateTime, Utc};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{bson::doc, Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

const COLLECTION: &str = "chat_threads";

/// One document per thread, messages embedded in conversational order.
///
/// Embedding keeps every transcript mutation a single document write, which
/// is what makes `get_or_create` (upsert) and `append` (`$push` with
/// `$each`) atomic per identity without any explicit locking.
#[derive(Debug, Serialize, Deserialize)]
struct ThreadDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    user_id: String,
    kind: ThreadKind,
    #[serde(default)]
    record_id: Option<String>,
    messages: Vec<StoredMessage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// MongoDB-backed transcript store.
#[derive(Clone)]
pub struct MongoHistoryStore {
    collection: Collection<ThreadDocument>,
}

impl MongoHistoryStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection(COLLECTION);
        Self { collection }
    }

    /// Create the unique identity index. Must run once at startup: the
    /// upsert in `get_or_create` needs it so that two concurrent first
    /// turns on the same identity cannot both insert — without it, both
    /// racers pass the upsert's no-match check and the identity ends up
    /// with two documents.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "kind": 1, "record_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn upsert_thread(&self, identity: &ThreadIdentity) -> Result<Vec<StoredMessage>> {
        // The identity fields come from the filter on insert; $setOnInsert
        // only carries what the filter does not pin down.
        let now = bson::to_bson(&Utc::now())?;
        let update = doc! {
            "$setOnInsert": {
                "messages": [],
                "created_at": now.clone(),
                "updated_at": now,
            }
        };

        let document = self
            .collection
            .find_one_and_update(Self::filter(identity), update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| HistoryError::ThreadNotFound(identity.to_string()))?;

        tracing::debug!(%identity, messages = document.messages.len(), "thread loaded");
        Ok(document.messages)
    }

    fn filter(identity: &ThreadIdentity) -> bson::Document {
        let record_id = match &identity.selector {
            ThreadSelector::Main => Bson::Null,
            ThreadSelector::FormSpecific(record_id) => Bson::String(record_id.clone()),
        };

        doc! {
            "user_id": &identity.user_id,
            "kind": identity.selector.kind().as_str(),
            "record_id": record_id,
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => write_error.code == 11000,
        ErrorKind::Command(ref command_error) => command_error.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn get_or_create(&self, identity: &ThreadIdentity) -> Result<Vec<StoredMessage>> {
        match self.upsert_thread(identity).await {
            // A concurrent first turn on the same identity can win the
            // insert between our no-match check and our insert; the unique
            // index turns that race into a duplicate-key error. Retry once:
            // the document now exists, so the second upsert matches it.
            Err(HistoryError::Database(err)) if is_duplicate_key(&err) => {
                tracing::debug!(%identity, "lost thread creation race, retrying");
                self.upsert_thread(identity).await
            }
            result => result,
        }
    }

    async fn append(&self, identity: &ThreadIdentity, messages: Vec<StoredMessage>) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let update = doc! {
            "$push": { "messages": { "$each": bson::to_bson(&messages)? } },
            "$set": { "updated_at": bson::to_bson(&Utc::now())? },
        };

        let result = self
            .collection
            .update_one(Self::filter(identity), update)
            .await?;

        if result.matched_count == 0 {
            return Err(HistoryError::ThreadNotFound(identity.to_string()));
        }

        Ok(())
    }

    async fn clear(&self, identity: &ThreadIdentity) -> Result<()> {
        let update = doc! {
            "$set": {
                "messages": [],
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };

        let result = self
            .collection
            .update_one(Self::filter(identity), update)
            .await?;

        if result.matched_count == 0 {
            return Err(HistoryError::ThreadNotFound(identity.to_string()));
        }

        Ok(())
    }

    async fn read(&self, identity: &ThreadIdentity) -> Result<Vec<StoredMessage>> {
        let document = self.collection.find_one(Self::filter(identity)).await?;
        Ok(document.map(|d| d.messages).unwrap_or_default())
    }
}
