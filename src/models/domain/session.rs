use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

const TOKEN_LENGTH: usize = 48;

/// A live login session. The client holds the opaque token; the server stores
/// only its SHA-256 digest, so a database read never yields a usable token.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: String, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id,
            token_hash,
            created_at: Utc::now(),
            expires_at,
        }
    }

    /// An expired session is treated identically to a terminated one.
    pub fn is_live(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
