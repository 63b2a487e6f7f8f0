use async_trait::async_trait;
use log::info;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::Session};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> AppResult<Session>;
    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<Session>>;
    /// Idempotent: deleting an unknown token is a no-op, not an error.
    async fn delete_by_token_hash(&self, hash: &str) -> AppResult<()>;
    async fn delete_expired(&self) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSessionRepository {
    collection: Collection<Session>,
}

impl MongoSessionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("sessions");
        Self { collection }
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn create(&self, session: Session) -> AppResult<Session> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<Session>> {
        let session = self
            .collection
            .find_one(doc! { "token_hash": hash })
            .await?;
        Ok(session)
    }

    async fn delete_by_token_hash(&self, hash: &str) -> AppResult<()> {
        self.collection
            .delete_one(doc! { "token_hash": hash })
            .await?;
        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let now = BsonDateTime::now();
        let result = self
            .collection
            .delete_many(doc! { "expires_at": { "$lt": now } })
            .await?;

        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let token_hash_options = IndexOptions::builder().unique(true).build();
        let token_hash_model = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(token_hash_options)
            .build();
        self.collection.create_index(token_hash_model).await?;
        info!("Created unique index on sessions.token_hash");

        let expires_at_model = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .build();
        self.collection.create_index(expires_at_model).await?;
        info!("Created index on sessions.expires_at");

        Ok(())
    }
}
