use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    auth::{AuthUser, SessionGuard},
    errors::{AppError, AppResult},
    models::{
        domain::{Lesson, Role},
        dto::response::OverviewResponse,
    },
    repositories::{ClassRepository, LessonRepository, MembershipRepository},
};

/// Read-only cross-class aggregation for the admin surface. This component
/// deliberately holds no mutating repository methods.
pub struct AdminService {
    classes: Arc<dyn ClassRepository>,
    memberships: Arc<dyn MembershipRepository>,
    lessons: Arc<dyn LessonRepository>,
    guard: Arc<SessionGuard>,
}

impl AdminService {
    pub fn new(
        classes: Arc<dyn ClassRepository>,
        memberships: Arc<dyn MembershipRepository>,
        lessons: Arc<dyn LessonRepository>,
        guard: Arc<SessionGuard>,
    ) -> Self {
        Self {
            classes,
            memberships,
            lessons,
            guard,
        }
    }

    /// The lesson sequence of one class, for the admin lessons view.
    pub async fn lessons_for_class(
        &self,
        auth: &AuthUser,
        class_id: &str,
    ) -> AppResult<Vec<Lesson>> {
        self.guard.authorize(auth, Role::Admin)?;

        self.classes
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        self.lessons.lessons_for_class(class_id).await
    }

    pub async fn overview(&self, auth: &AuthUser) -> AppResult<OverviewResponse> {
        self.guard.authorize(auth, Role::Admin)?;

        let classes = self.classes.find_all().await?;
        let total_students = self.memberships.distinct_student_count().await?;

        let mut lessons_per_class = HashMap::new();
        for class in &classes {
            let class_id = class.id_hex();
            let count = self.lessons.count_for_class(&class_id).await?;
            lessons_per_class.insert(class_id, count);
        }

        Ok(OverviewResponse {
            total_classes: classes.len() as u64,
            total_students,
            lessons_per_class,
        })
    }
}
