use async_trait::async_trait;
use futures::TryStreamExt;
use log::info;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{is_duplicate_key, AppError, AppResult},
    models::domain::Membership,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// The unique compound index on (student_id, class_id) is what closes the
    /// concurrent-join race: a second insert for the same pair fails with
    /// `AlreadyExists` instead of creating a duplicate.
    async fn insert(&self, membership: Membership) -> AppResult<Membership>;
    async fn find(&self, student_id: &str, class_id: &str) -> AppResult<Option<Membership>>;
    async fn list_by_class(&self, class_id: &str) -> AppResult<Vec<Membership>>;
    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<Membership>>;
    /// Returns whether a membership was actually removed.
    async fn delete(&self, student_id: &str, class_id: &str) -> AppResult<bool>;
    async fn delete_by_class(&self, class_id: &str) -> AppResult<u64>;
    async fn distinct_student_count(&self) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoMembershipRepository {
    collection: Collection<Membership>,
}

impl MongoMembershipRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("memberships");
        Self { collection }
    }
}

#[async_trait]
impl MembershipRepository for MongoMembershipRepository {
    async fn insert(&self, membership: Membership) -> AppResult<Membership> {
        match self.collection.insert_one(&membership).await {
            Ok(_) => Ok(membership),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(
                "Student is already enrolled in this class".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn find(&self, student_id: &str, class_id: &str) -> AppResult<Option<Membership>> {
        let membership = self
            .collection
            .find_one(doc! { "student_id": student_id, "class_id": class_id })
            .await?;
        Ok(membership)
    }

    async fn list_by_class(&self, class_id: &str) -> AppResult<Vec<Membership>> {
        let cursor = self
            .collection
            .find(doc! { "class_id": class_id })
            .sort(doc! { "joined_at": 1 })
            .await?;
        let memberships: Vec<Membership> = cursor.try_collect().await?;
        Ok(memberships)
    }

    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<Membership>> {
        let cursor = self
            .collection
            .find(doc! { "student_id": student_id })
            .sort(doc! { "joined_at": 1 })
            .await?;
        let memberships: Vec<Membership> = cursor.try_collect().await?;
        Ok(memberships)
    }

    async fn delete(&self, student_id: &str, class_id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "student_id": student_id, "class_id": class_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_class(&self, class_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "class_id": class_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn distinct_student_count(&self) -> AppResult<u64> {
        let students = self.collection.distinct("student_id", doc! {}).await?;
        Ok(students.len() as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let pair_options = IndexOptions::builder().unique(true).build();
        let pair_model = IndexModel::builder()
            .keys(doc! { "student_id": 1, "class_id": 1 })
            .options(pair_options)
            .build();
        self.collection.create_index(pair_model).await?;
        info!("Created unique index on memberships.(student_id, class_id)");

        let class_model = IndexModel::builder()
            .keys(doc! { "class_id": 1 })
            .build();
        self.collection.create_index(class_model).await?;
        info!("Created index on memberships.class_id");

        Ok(())
    }
}
