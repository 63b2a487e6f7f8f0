pub mod class_repository;
pub mod lesson_repository;
pub mod membership_repository;
pub mod session_repository;
pub mod user_repository;

pub use class_repository::{ClassRepository, MongoClassRepository};
pub use lesson_repository::{LessonRepository, MongoLessonRepository};
pub use membership_repository::{MembershipRepository, MongoMembershipRepository};
pub use session_repository::{MongoSessionRepository, SessionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use class_repository::MockClassRepository;
#[cfg(test)]
pub use lesson_repository::MockLessonRepository;
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
