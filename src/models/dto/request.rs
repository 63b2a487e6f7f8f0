use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub display_name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// "student" or "teacher". Admin accounts are never self-registered.
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email.
    #[validate(length(min = 1))]
    pub identifier: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinClassRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_valid_register_request() {
        let request = RegisterRequest {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            display_name: "John Doe".to_string(),
            password: "correct horse".to_string(),
            role: "student".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_short_password() {
        let request = RegisterRequest {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            display_name: "John Doe".to_string(),
            password: "short".to_string(),
            role: "student".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_rejects_invalid_email() {
        let request = RegisterRequest {
            username: "jdoe".to_string(),
            email: "not-an-email".to_string(),
            display_name: "John Doe".to_string(),
            password: "correct horse".to_string(),
            role: "student".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_join_request_rejects_empty_code() {
        let request = JoinClassRequest {
            code: "".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
