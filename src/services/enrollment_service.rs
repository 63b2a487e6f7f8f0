use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    auth::{AuthUser, SessionGuard},
    errors::{AppError, AppResult},
    models::{
        domain::{Membership, Role, User},
        dto::response::EnrolledClassResponse,
    },
    repositories::{ClassRepository, MembershipRepository, UserRepository},
    services::ClassService,
};

/// Binds students to classes. Code resolution and ownership checks are
/// delegated to the class registry; membership records are owned here.
pub struct EnrollmentService {
    memberships: Arc<dyn MembershipRepository>,
    classes: Arc<dyn ClassRepository>,
    users: Arc<dyn UserRepository>,
    registry: Arc<ClassService>,
    guard: Arc<SessionGuard>,
}

impl EnrollmentService {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        classes: Arc<dyn ClassRepository>,
        users: Arc<dyn UserRepository>,
        registry: Arc<ClassService>,
        guard: Arc<SessionGuard>,
    ) -> Self {
        Self {
            memberships,
            classes,
            users,
            registry,
            guard,
        }
    }

    /// Join the class a code resolves to. Joining a class twice returns the
    /// existing membership instead of erroring; when two joins for the same
    /// pair race, the unique index lets exactly one insert through and the
    /// loser is handed the winner's record.
    pub async fn join_class(&self, auth: &AuthUser, code: &str) -> AppResult<Membership> {
        self.guard.authorize(auth, Role::Student)?;

        let class = self.registry.resolve_code(code).await?;
        let class_id = class.id_hex();

        if let Some(existing) = self.memberships.find(&auth.user_id, &class_id).await? {
            return Ok(existing);
        }

        match self
            .memberships
            .insert(Membership::new(&auth.user_id, &class_id))
            .await
        {
            Ok(created) => Ok(created),
            Err(AppError::AlreadyExists(_)) => self
                .memberships
                .find(&auth.user_id, &class_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError("Membership vanished during join".to_string())
                }),
            Err(err) => Err(err),
        }
    }

    pub async fn leave_class(&self, auth: &AuthUser, class_id: &str) -> AppResult<()> {
        self.guard.authorize(auth, Role::Student)?;

        if !self.memberships.delete(&auth.user_id, class_id).await? {
            return Err(AppError::NotEnrolled);
        }

        Ok(())
    }

    /// The class roster in enrollment order. Only the owning teacher may see
    /// it; any other teacher gets `Forbidden`.
    pub async fn roster_for_class(&self, auth: &AuthUser, class_id: &str) -> AppResult<Vec<User>> {
        self.guard.authorize(auth, Role::Teacher)?;
        self.registry.owned_class(auth, class_id).await?;

        let memberships = self.memberships.list_by_class(class_id).await?;
        let student_ids: Vec<String> = memberships
            .iter()
            .map(|m| m.student_id.clone())
            .collect();

        let students = self.users.find_by_ids(&student_ids).await?;
        let mut by_id: HashMap<String, User> = students
            .into_iter()
            .map(|user| (user.id_hex(), user))
            .collect();

        // Re-impose join order; the lookup comes back unordered
        Ok(student_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    /// Remove a student from a class the caller owns.
    pub async fn remove_student(
        &self,
        auth: &AuthUser,
        class_id: &str,
        student_id: &str,
    ) -> AppResult<()> {
        self.guard.authorize(auth, Role::Teacher)?;
        self.registry.owned_class(auth, class_id).await?;

        if !self.memberships.delete(student_id, class_id).await? {
            return Err(AppError::NotEnrolled);
        }

        Ok(())
    }

    /// All classes the student is enrolled in, with their teachers' display
    /// names, in join order.
    pub async fn classes_for_student(
        &self,
        auth: &AuthUser,
    ) -> AppResult<Vec<EnrolledClassResponse>> {
        self.guard.authorize(auth, Role::Student)?;

        let memberships = self.memberships.list_by_student(&auth.user_id).await?;
        let class_ids: Vec<String> = memberships.iter().map(|m| m.class_id.clone()).collect();

        let classes = self.classes.find_by_ids(&class_ids).await?;
        let teacher_ids: Vec<String> = classes.iter().map(|c| c.teacher_id.clone()).collect();
        let teachers: HashMap<String, User> = self
            .users
            .find_by_ids(&teacher_ids)
            .await?
            .into_iter()
            .map(|user| (user.id_hex(), user))
            .collect();

        let by_id: HashMap<String, _> = classes
            .into_iter()
            .map(|class| (class.id_hex(), class))
            .collect();

        Ok(memberships
            .into_iter()
            .filter_map(|membership| {
                let class = by_id.get(&membership.class_id)?;
                let teacher_name = teachers
                    .get(&class.teacher_id)
                    .map(|t| t.display_name.clone())
                    .unwrap_or_default();
                Some(EnrolledClassResponse {
                    class_id: membership.class_id,
                    class_name: class.name.clone(),
                    teacher_name,
                    joined_at: membership.joined_at,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        MockClassRepository, MockMembershipRepository, MockSessionRepository, MockUserRepository,
    };

    fn guard() -> Arc<SessionGuard> {
        Arc::new(SessionGuard::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSessionRepository::new()),
            24,
        ))
    }

    fn auth(user_id: &str, role: Role) -> AuthUser {
        AuthUser {
            user_id: user_id.to_string(),
            username: "someone".to_string(),
            display_name: "Someone".to_string(),
            role,
        }
    }

    fn service(
        memberships: MockMembershipRepository,
        classes_for_registry: MockClassRepository,
    ) -> EnrollmentService {
        let guard = guard();
        let registry = Arc::new(ClassService::new(
            Arc::new(classes_for_registry),
            Arc::new(MockMembershipRepository::new()),
            guard.clone(),
        ));
        EnrollmentService::new(
            Arc::new(memberships),
            Arc::new(MockClassRepository::new()),
            Arc::new(MockUserRepository::new()),
            registry,
            guard,
        )
    }

    #[tokio::test]
    async fn test_join_requires_student_role() {
        let service = service(MockMembershipRepository::new(), MockClassRepository::new());
        let result = service
            .join_class(&auth("teacher-1", Role::Teacher), "AB12CD")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_join_with_unknown_code_fails() {
        let mut classes = MockClassRepository::new();
        classes.expect_find_by_code().returning(|_| Ok(None));

        let service = service(MockMembershipRepository::new(), classes);
        let result = service
            .join_class(&auth("student-1", Role::Student), "ZZZZZZ")
            .await;

        assert!(matches!(result, Err(AppError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_join_returns_existing_membership() {
        let class = crate::models::domain::Class::new("teacher-1", "Algebra", "AB12CD");
        let class_id = class.id_hex();
        let existing = Membership::new("student-1", &class_id);
        let existing_id = existing.id;

        let mut classes = MockClassRepository::new();
        classes
            .expect_find_by_code()
            .returning(move |_| Ok(Some(class.clone())));

        let mut memberships = MockMembershipRepository::new();
        memberships
            .expect_find()
            .returning(move |_, _| Ok(Some(existing.clone())));
        memberships.expect_insert().times(0);

        let service = service(memberships, classes);
        let membership = service
            .join_class(&auth("student-1", Role::Student), "AB12CD")
            .await
            .unwrap();

        assert_eq!(membership.id, existing_id);
    }

    #[tokio::test]
    async fn test_join_losing_a_race_returns_winner_record() {
        let class = crate::models::domain::Class::new("teacher-1", "Algebra", "AB12CD");
        let class_id = class.id_hex();
        let winner = Membership::new("student-1", &class_id);
        let winner_id = winner.id;

        let mut classes = MockClassRepository::new();
        classes
            .expect_find_by_code()
            .returning(move |_| Ok(Some(class.clone())));

        // The pre-check misses, the insert collides, the re-read finds the
        // record the concurrent join created
        let mut memberships = MockMembershipRepository::new();
        let mut find_calls = 0;
        memberships.expect_find().times(2).returning(move |_, _| {
            find_calls += 1;
            if find_calls == 1 {
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
        memberships
            .expect_insert()
            .returning(|_| Err(AppError::AlreadyExists("already enrolled".into())));

        let service = service(memberships, classes);
        let membership = service
            .join_class(&auth("student-1", Role::Student), "AB12CD")
            .await
            .unwrap();

        assert_eq!(membership.id, winner_id);
    }

    #[tokio::test]
    async fn test_leave_when_not_enrolled() {
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_delete().returning(|_, _| Ok(false));

        let service = service(memberships, MockClassRepository::new());
        let result = service
            .leave_class(&auth("student-1", Role::Student), "some-class")
            .await;

        assert!(matches!(result, Err(AppError::NotEnrolled)));
    }

    #[tokio::test]
    async fn test_roster_denied_for_foreign_teacher() {
        let mut classes = MockClassRepository::new();
        classes.expect_find_by_id().returning(|_| {
            Ok(Some(crate::models::domain::Class::new(
                "teacher-2", "Algebra", "AB12CD",
            )))
        });

        let service = service(MockMembershipRepository::new(), classes);
        let result = service
            .roster_for_class(&auth("teacher-1", Role::Teacher), "some-class")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
