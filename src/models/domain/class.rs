use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A class owned by exactly one teacher. The class code is the only token
/// students need to enroll; it is unique across all classes and regenerable.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Class {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub teacher_id: String,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl Class {
    pub fn new(teacher_id: &str, name: &str, code: &str) -> Self {
        Class {
            id: Some(ObjectId::new()),
            teacher_id: teacher_id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.as_ref().map(|oid| oid.to_hex()).unwrap_or_default()
    }
}
