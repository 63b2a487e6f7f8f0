use std::sync::Arc;

use log::info;

use crate::{
    auth::SessionGuard,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ClassRepository, LessonRepository, MembershipRepository, MongoClassRepository,
        MongoLessonRepository, MongoMembershipRepository, MongoSessionRepository,
        MongoUserRepository, SessionRepository, UserRepository,
    },
    services::{AdminService, ClassService, EnrollmentService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub session_guard: Arc<SessionGuard>,
    pub user_service: Arc<UserService>,
    pub class_service: Arc<ClassService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub admin_service: Arc<AdminService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db));
        let classes: Arc<dyn ClassRepository> = Arc::new(MongoClassRepository::new(&db));
        let memberships: Arc<dyn MembershipRepository> =
            Arc::new(MongoMembershipRepository::new(&db));
        let sessions: Arc<dyn SessionRepository> = Arc::new(MongoSessionRepository::new(&db));
        let lessons: Arc<dyn LessonRepository> = Arc::new(MongoLessonRepository::new(&db));

        users.ensure_indexes().await?;
        classes.ensure_indexes().await?;
        memberships.ensure_indexes().await?;
        sessions.ensure_indexes().await?;
        lessons.ensure_indexes().await?;

        let purged = sessions.delete_expired().await?;
        if purged > 0 {
            info!("Purged {} expired session(s)", purged);
        }

        let session_guard = Arc::new(SessionGuard::new(
            users.clone(),
            sessions,
            config.session_ttl_hours,
        ));

        let user_service = Arc::new(UserService::new(users.clone()));
        user_service.bootstrap_admin(&config).await?;

        let class_service = Arc::new(ClassService::new(
            classes.clone(),
            memberships.clone(),
            session_guard.clone(),
        ));
        let enrollment_service = Arc::new(EnrollmentService::new(
            memberships.clone(),
            classes.clone(),
            users,
            class_service.clone(),
            session_guard.clone(),
        ));
        let admin_service = Arc::new(AdminService::new(
            classes,
            memberships,
            lessons,
            session_guard.clone(),
        ));

        Ok(Self {
            db,
            config: Arc::new(config),
            session_guard,
            user_service,
            class_service,
            enrollment_service,
            admin_service,
        })
    }
}
