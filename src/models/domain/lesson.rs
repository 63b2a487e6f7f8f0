use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Lesson content belongs to an external collaborator; only the per-class
/// association is read here, for admin aggregation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Lesson {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub class_id: String,
    pub title: String,
    pub position: i32,
}
