use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Closed set of roles. Roles are assigned at registration and never change
/// afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Admin satisfies every check; teacher and student satisfy only their
    /// own. There is no hierarchy between teacher and student.
    pub fn satisfies(self, required: Role) -> bool {
        self == Role::Admin || self == required
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Teacher => write!(f, "teacher"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: &str,
        email: &str,
        display_name: &str,
        password_hash: &str,
        role: Role,
    ) -> Self {
        User {
            id: Some(ObjectId::new()),
            username: username.to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.as_ref().map(|oid| oid.to_hex()).unwrap_or_default()
    }
}

#[cfg(test)]
impl User {
    pub fn test_user(username: &str, role: Role) -> Self {
        User::new(
            username,
            &format!("{}@example.com", username),
            username,
            "$argon2id$test-hash",
            role,
        )
    }
}
