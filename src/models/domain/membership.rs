use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// The join record binding one student to one class. At most one membership
/// exists per (student, class) pair; the storage layer enforces this with a
/// unique compound index. `joined_at` orders rosters by enrollment.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Membership {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub student_id: String,
    pub class_id: String,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(student_id: &str, class_id: &str) -> Self {
        Membership {
            id: Some(ObjectId::new()),
            student_id: student_id.to_string(),
            class_id: class_id.to_string(),
            joined_at: Utc::now(),
        }
    }
}
