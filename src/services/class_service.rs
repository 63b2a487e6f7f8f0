use std::sync::Arc;

use log::{error, info};
use rand::Rng;
use validator::Validate;

use crate::{
    auth::{AuthUser, SessionGuard},
    errors::{AppError, AppResult},
    models::{
        domain::{Class, Role},
        dto::request::CreateClassRequest,
    },
    repositories::{ClassRepository, MembershipRepository},
};

pub const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Collisions in a 36^6 code space are vanishingly rare; running out of
/// retries means something is badly wrong and is reported as such.
const MAX_CODE_ATTEMPTS: usize = 8;

/// Owns class entities and their codes. All code issuance and resolution
/// goes through here.
pub struct ClassService {
    classes: Arc<dyn ClassRepository>,
    memberships: Arc<dyn MembershipRepository>,
    guard: Arc<SessionGuard>,
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

impl ClassService {
    pub fn new(
        classes: Arc<dyn ClassRepository>,
        memberships: Arc<dyn MembershipRepository>,
        guard: Arc<SessionGuard>,
    ) -> Self {
        Self {
            classes,
            memberships,
            guard,
        }
    }

    /// Create a class with a freshly drawn unique code. The unique index on
    /// the code column decides collisions; each collision draws again.
    pub async fn create_class(
        &self,
        auth: &AuthUser,
        request: CreateClassRequest,
    ) -> AppResult<Class> {
        self.guard.authorize(auth, Role::Teacher)?;
        request.validate()?;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let class = Class::new(&auth.user_id, &request.name, &generate_code());
            match self.classes.insert(class).await {
                Ok(created) => return Ok(created),
                Err(AppError::AlreadyExists(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        error!(
            "class code space exhausted: {} consecutive collisions while creating a class for teacher {}",
            MAX_CODE_ATTEMPTS, auth.user_id
        );
        Err(AppError::CodeSpaceExhausted)
    }

    /// Swap in a new code. The previous code stops resolving in the same
    /// atomic update that installs the new one.
    pub async fn regenerate_code(&self, auth: &AuthUser, class_id: &str) -> AppResult<Class> {
        self.guard.authorize(auth, Role::Teacher)?;
        self.owned_class(auth, class_id).await?;

        for _ in 0..MAX_CODE_ATTEMPTS {
            match self.classes.set_code(class_id, &generate_code()).await {
                Ok(updated) => return Ok(updated),
                Err(AppError::AlreadyExists(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        error!(
            "class code space exhausted: {} consecutive collisions while regenerating the code of class {}",
            MAX_CODE_ATTEMPTS, class_id
        );
        Err(AppError::CodeSpaceExhausted)
    }

    /// Codes are stored uppercase; input is trimmed and uppercased before the
    /// lookup, so matching is case-insensitive.
    pub async fn resolve_code(&self, code: &str) -> AppResult<Class> {
        let normalized = code.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(AppError::InvalidCode);
        }

        self.classes
            .find_by_code(&normalized)
            .await?
            .ok_or(AppError::InvalidCode)
    }

    pub async fn list_classes_for_teacher(&self, auth: &AuthUser) -> AppResult<Vec<Class>> {
        self.guard.authorize(auth, Role::Teacher)?;
        self.classes.list_by_teacher(&auth.user_id).await
    }

    /// Look up a class and check that the caller owns it. A class that exists
    /// but belongs to someone else fails with `Forbidden`.
    pub async fn owned_class(&self, auth: &AuthUser, class_id: &str) -> AppResult<Class> {
        let class = self
            .classes
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        if class.teacher_id != auth.user_id {
            return Err(AppError::Forbidden(
                "You do not own this class".to_string(),
            ));
        }

        Ok(class)
    }

    /// Delete a class and cascade-delete its memberships, so no roster entry
    /// outlives its class. The class document goes first, which stops its
    /// code from resolving before the roster is cleared.
    pub async fn delete_class(&self, auth: &AuthUser, class_id: &str) -> AppResult<()> {
        self.guard.authorize(auth, Role::Teacher)?;
        self.owned_class(auth, class_id).await?;

        self.classes.delete(class_id).await?;
        let removed = self.memberships.delete_by_class(class_id).await?;
        info!(
            "Deleted class {} and {} membership(s)",
            class_id, removed
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        MockClassRepository, MockMembershipRepository, MockSessionRepository, MockUserRepository,
    };
    use mockall::predicate::eq;

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

    fn service(classes: MockClassRepository) -> ClassService {
        ClassService::new(
            Arc::new(classes),
            Arc::new(MockMembershipRepository::new()),
            guard(),
        )
    }

    #[test]
    fn test_generated_codes_use_fixed_length_uppercase_alphabet() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_create_class_requires_teacher() {
        let service = service(MockClassRepository::new());
        let request = CreateClassRequest {
            name: "Algebra".to_string(),
        };

        let result = service
            .create_class(&auth("student-1", Role::Student), request)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_class_retries_on_code_collision() {
        let mut classes = MockClassRepository::new();
        let mut calls = 0;
        classes.expect_insert().times(3).returning(move |class| {
            calls += 1;
            if calls < 3 {
                Err(AppError::AlreadyExists("Class code already in use".into()))
            } else {
                Ok(class)
            }
        });

        let service = service(classes);
        let request = CreateClassRequest {
            name: "Algebra".to_string(),
        };

        let class = service
            .create_class(&auth("teacher-1", Role::Teacher), request)
            .await
            .unwrap();
        assert_eq!(class.code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn test_create_class_gives_up_after_bounded_retries() {
        let mut classes = MockClassRepository::new();
        classes
            .expect_insert()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|_| Err(AppError::AlreadyExists("Class code already in use".into())));

        let service = service(classes);
        let request = CreateClassRequest {
            name: "Algebra".to_string(),
        };

        let result = service
            .create_class(&auth("teacher-1", Role::Teacher), request)
            .await;
        assert!(matches!(result, Err(AppError::CodeSpaceExhausted)));
    }

    #[tokio::test]
    async fn test_resolve_code_trims_and_uppercases() {
        let mut classes = MockClassRepository::new();
        classes
            .expect_find_by_code()
            .with(eq("AB12CD"))
            .returning(|_| Ok(Some(Class::new("teacher-1", "Algebra", "AB12CD"))));

        let service = service(classes);
        let class = service.resolve_code("  ab12cd ").await.unwrap();

        assert_eq!(class.code, "AB12CD");
    }

    #[tokio::test]
    async fn test_resolve_code_unknown_is_invalid() {
        let mut classes = MockClassRepository::new();
        classes.expect_find_by_code().returning(|_| Ok(None));

        let service = service(classes);
        let result = service.resolve_code("ZZZZZZ").await;

        assert!(matches!(result, Err(AppError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_resolve_code_rejects_blank_input() {
        let service = service(MockClassRepository::new());
        let result = service.resolve_code("   ").await;

        assert!(matches!(result, Err(AppError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_regenerate_code_requires_ownership() {
        let mut classes = MockClassRepository::new();
        classes
            .expect_find_by_id()
            .returning(|_| Ok(Some(Class::new("teacher-2", "Algebra", "AB12CD"))));

        let service = service(classes);
        let result = service
            .regenerate_code(&auth("teacher-1", Role::Teacher), "some-class")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_class_cascades_memberships() {
        let class = Class::new("teacher-1", "Algebra", "AB12CD");
        let class_id = class.id_hex();

        let mut classes = MockClassRepository::new();
        let found = class.clone();
        classes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let expected_id = class_id.clone();
        classes
            .expect_delete()
            .withf(move |id: &str| id == expected_id)
            .times(1)
            .returning(|_| Ok(()));

        let mut memberships = MockMembershipRepository::new();
        let expected_id = class_id.clone();
        memberships
            .expect_delete_by_class()
            .withf(move |id: &str| id == expected_id)
            .times(1)
            .returning(|_| Ok(2));

        let service = ClassService::new(Arc::new(classes), Arc::new(memberships), guard());
        let result = service
            .delete_class(&auth("teacher-1", Role::Teacher), &class_id)
            .await;

        assert!(result.is_ok());
    }
}
