use async_trait::async_trait;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{is_duplicate_key, AppError, AppResult},
    models::domain::User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(
                "Username or email already registered".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let user = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let oids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": oids } })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let username_options = IndexOptions::builder().unique(true).build();
        let username_model = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(username_options)
            .build();
        self.collection.create_index(username_model).await?;
        info!("Created unique index on users.username");

        let email_options = IndexOptions::builder().unique(true).build();
        let email_model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(email_options)
            .build();
        self.collection.create_index(email_model).await?;
        info!("Created unique index on users.email");

        Ok(())
    }
}
