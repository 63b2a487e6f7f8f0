use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub session_ttl_hours: i64,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: SecretString,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "aula-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".to_string()),
            admin_password: SecretString::from(
                env::var("ADMIN_PASSWORD")
                    .unwrap_or_else(|_| "dev_admin_password_change_me".to_string()),
            ),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let admin_password = self.admin_password.expose_secret();

        if admin_password == "dev_admin_password_change_me" {
            panic!(
                "FATAL: ADMIN_PASSWORD is using default value! Set ADMIN_PASSWORD environment variable to a secure value."
            );
        }

        if admin_password.len() < 12 {
            panic!(
                "FATAL: ADMIN_PASSWORD is too short ({}). Must be at least 12 characters.",
                admin_password.len()
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "aula-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            session_ttl_hours: 1,
            admin_username: "admin".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: SecretString::from("test_admin_password".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        // Should use env vars if set, or fall back to defaults
        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.session_ttl_hours > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.mongo_conn_string, "mongodb://localhost:27017");
        assert_eq!(config.mongo_db_name, "aula-test");
        assert_eq!(config.session_ttl_hours, 1);
        assert_eq!(config.admin_username, "admin");
    }
}
