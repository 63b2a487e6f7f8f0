use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::AuthUser;
use crate::models::domain::{Class, Lesson, Membership, Role, User};

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id_hex(),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl From<AuthUser> for MeResponse {
    fn from(auth: AuthUser) -> Self {
        MeResponse {
            user_id: auth.user_id,
            username: auth.username,
            display_name: auth.display_name,
            role: auth.role,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassResponse {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl From<Class> for ClassResponse {
    fn from(class: Class) -> Self {
        ClassResponse {
            id: class.id_hex(),
            name: class.name,
            code: class.code,
            created_at: class.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub class_id: String,
    pub student_id: String,
    pub joined_at: DateTime<Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        MembershipResponse {
            class_id: membership.class_id,
            student_id: membership.student_id,
            joined_at: membership.joined_at,
        }
    }
}

/// A class as seen from the enrolled student's side.
#[derive(Debug, Serialize)]
pub struct EnrolledClassResponse {
    pub class_id: String,
    pub class_name: String,
    pub teacher_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub username: String,
    pub display_name: String,
}

impl From<User> for RosterEntry {
    fn from(user: User) -> Self {
        RosterEntry {
            student_id: user.id_hex(),
            username: user.username,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub class_id: String,
    pub title: String,
    pub position: i32,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        LessonResponse {
            class_id: lesson.class_id,
            title: lesson.title,
            position: lesson.position,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OverviewResponse {
    pub total_classes: u64,
    pub total_students: u64,
    pub lessons_per_class: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_omits_password_hash() {
        let user = User::test_user("jdoe", Role::Student);
        let response = UserResponse::from(user);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"username\":\"jdoe\""));
        assert!(json.contains("\"role\":\"student\""));
    }

    #[test]
    fn test_class_response_from_class() {
        let class = Class::new("teacher-1", "Algebra", "AB12CD");
        let response = ClassResponse::from(class);

        assert_eq!(response.name, "Algebra");
        assert_eq!(response.code, "AB12CD");
        assert_eq!(response.id.len(), 24);
    }
}
