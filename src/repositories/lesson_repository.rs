use async_trait::async_trait;
use futures::TryStreamExt;
use log::info;
use mongodb::{bson::doc, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Lesson};

/// Read-only view over the lesson-content collaborator's data. Only the
/// admin aggregation consumes it; nothing here can mutate lessons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn lessons_for_class(&self, class_id: &str) -> AppResult<Vec<Lesson>>;
    async fn count_for_class(&self, class_id: &str) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoLessonRepository {
    collection: Collection<Lesson>,
}

impl MongoLessonRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("lessons");
        Self { collection }
    }
}

#[async_trait]
impl LessonRepository for MongoLessonRepository {
    async fn lessons_for_class(&self, class_id: &str) -> AppResult<Vec<Lesson>> {
        let cursor = self
            .collection
            .find(doc! { "class_id": class_id })
            .sort(doc! { "position": 1 })
            .await?;
        let lessons: Vec<Lesson> = cursor.try_collect().await?;
        Ok(lessons)
    }

    async fn count_for_class(&self, class_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "class_id": class_id })
            .await?;
        Ok(count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let class_model = IndexModel::builder()
            .keys(doc! { "class_id": 1 })
            .build();
        self.collection.create_index(class_model).await?;
        info!("Created index on lessons.class_id");

        Ok(())
    }
}
