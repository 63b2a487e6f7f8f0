use std::sync::Arc;

use log::info;
use secrecy::ExposeSecret;
use validator::Validate;

use crate::{
    auth::password,
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{Role, User},
        dto::request::RegisterRequest,
    },
    repositories::UserRepository,
};

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new student or teacher account. Roles are fixed at
    /// registration; there is no path to admin from here.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;
        let role = parse_signup_role(&request.role)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }
        if self
            .users
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists("Username already taken".to_string()));
        }

        let password_hash = password::hash_password(&request.password)?;
        let user = User::new(
            &request.username,
            &request.email,
            &request.display_name,
            &password_hash,
            role,
        );

        // The unique indexes on username and email backstop a concurrent
        // registration that slips past the checks above
        self.users.create(user).await
    }

    /// Provision the admin account from configuration when it does not exist
    /// yet. Admin accounts are only ever created here.
    pub async fn bootstrap_admin(&self, config: &Config) -> AppResult<()> {
        if self
            .users
            .find_by_username(&config.admin_username)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let password_hash = password::hash_password(config.admin_password.expose_secret())?;
        let admin = User::new(
            &config.admin_username,
            &config.admin_email,
            "Administrator",
            &password_hash,
            Role::Admin,
        );

        match self.users.create(admin).await {
            Ok(_) => {
                info!("Provisioned admin account '{}'", config.admin_username);
                Ok(())
            }
            // Another instance won the race; the account exists either way
            Err(AppError::AlreadyExists(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

fn parse_signup_role(role: &str) -> AppResult<Role> {
    match role.trim().to_lowercase().as_str() {
        "student" => Ok(Role::Student),
        "teacher" => Ok(Role::Teacher),
        _ => Err(AppError::ValidationError(
            "Role must be student or teacher".to_string(),
        )),
    }
}
