use async_trait::async_trait;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{is_duplicate_key, AppError, AppResult},
    models::domain::Class,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the class code collides with one
    /// already in use (unique index on `code`).
    async fn insert(&self, class: Class) -> AppResult<Class>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Class>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Class>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Class>>;
    async fn list_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Class>>;
    async fn find_all(&self) -> AppResult<Vec<Class>>;
    /// Installs a new code in a single document update, so the old code stops
    /// resolving in the same instant the new one starts. Fails with
    /// `AlreadyExists` on a code collision.
    async fn set_code(&self, class_id: &str, code: &str) -> AppResult<Class>;
    async fn delete(&self, class_id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoClassRepository {
    collection: Collection<Class>,
}

impl MongoClassRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("classes");
        Self { collection }
    }
}

#[async_trait]
impl ClassRepository for MongoClassRepository {
    async fn insert(&self, class: Class) -> AppResult<Class> {
        match self.collection.insert_one(&class).await {
            Ok(_) => Ok(class),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(
                "Class code already in use".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Class>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let class = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(class)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Class>> {
        let oids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": oids } })
            .await?;
        let classes: Vec<Class> = cursor.try_collect().await?;
        Ok(classes)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Class>> {
        let class = self.collection.find_one(doc! { "code": code }).await?;
        Ok(class)
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Class>> {
        let cursor = self
            .collection
            .find(doc! { "teacher_id": teacher_id })
            .sort(doc! { "created_at": 1 })
            .await?;
        let classes: Vec<Class> = cursor.try_collect().await?;
        Ok(classes)
    }

    async fn find_all(&self) -> AppResult<Vec<Class>> {
        let cursor = self.collection.find(doc! {}).await?;
        let classes: Vec<Class> = cursor.try_collect().await?;
        Ok(classes)
    }

    async fn set_code(&self, class_id: &str, code: &str) -> AppResult<Class> {
        let oid = ObjectId::parse_str(class_id)
            .map_err(|_| AppError::NotFound(format!("Class '{}' not found", class_id)))?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": { "code": code } })
            .with_options(options)
            .await;

        match updated {
            Ok(Some(class)) => Ok(class),
            Ok(None) => Err(AppError::NotFound(format!("Class '{}' not found", class_id))),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(
                "Class code already in use".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, class_id: &str) -> AppResult<()> {
        let oid = ObjectId::parse_str(class_id)
            .map_err(|_| AppError::NotFound(format!("Class '{}' not found", class_id)))?;

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Class '{}' not found", class_id)));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let code_options = IndexOptions::builder().unique(true).build();
        let code_model = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(code_options)
            .build();
        self.collection.create_index(code_model).await?;
        info!("Created unique index on classes.code");

        let teacher_model = IndexModel::builder()
            .keys(doc! { "teacher_id": 1 })
            .build();
        self.collection.create_index(teacher_model).await?;
        info!("Created index on classes.teacher_id");

        Ok(())
    }
}
