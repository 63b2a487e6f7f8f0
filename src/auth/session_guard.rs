use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    auth::password,
    errors::{AppError, AppResult},
    models::domain::{
        session::{generate_token, hash_token},
        Role, Session, User,
    },
    repositories::{SessionRepository, UserRepository},
};

/// The authenticated identity attached to a request once its session token
/// has resolved.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

/// Sole owner of session state. Every other component checks capabilities
/// through `resolve` + `authorize` instead of touching sessions directly.
pub struct SessionGuard {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    session_ttl_hours: i64,
}

impl SessionGuard {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl_hours,
        }
    }

    /// Validate credentials and open a new session. The identifier matches
    /// either username or email. Unknown identifier and wrong password both
    /// yield `InvalidCredentials`, so a caller cannot probe which accounts
    /// exist.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> AppResult<(String, User)> {
        let identifier = identifier.trim();

        let user = if identifier.contains('@') {
            self.users.find_by_email(identifier).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let Some(user) = user else {
            return Err(AppError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_ttl_hours);
        let session = Session::new(user.id_hex(), hash_token(&token), expires_at);
        self.sessions.create(session).await?;

        Ok((token, user))
    }

    /// Resolve a bearer token to its user. Expired, terminated, and unknown
    /// tokens are indistinguishable: all fail with `Unauthenticated`.
    pub async fn resolve(&self, token: &str) -> AppResult<AuthUser> {
        let session = self
            .sessions
            .find_by_token_hash(&hash_token(token))
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if !session.is_live() {
            return Err(AppError::Unauthenticated);
        }

        let user = self
            .users
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(AuthUser {
            user_id: session.user_id,
            username: user.username,
            display_name: user.display_name,
            role: user.role,
        })
    }

    /// The single capability check every operation goes through.
    pub fn authorize(&self, auth: &AuthUser, required: Role) -> AppResult<()> {
        if auth.role.satisfies(required) {
            return Ok(());
        }

        let message = match required {
            Role::Student => "Student access required",
            Role::Teacher => "Teacher access required",
            Role::Admin => "Admin access required",
        };
        Err(AppError::Forbidden(message.to_string()))
    }

    /// Idempotent: terminating an unknown or already-terminated token is a
    /// no-op.
    pub async fn terminate(&self, token: &str) -> AppResult<()> {
        self.sessions.delete_by_token_hash(&hash_token(token)).await
    }
}
