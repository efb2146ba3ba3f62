/// Configuration management for the API server
///
/// Configuration is loaded from environment variables (with `.env`
/// support via dotenvy for development).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `JWT_SECRET`: Session token signing secret, >= 32 chars (required)
/// - `SESSION_TTL_DAYS`: Session validity window (default: 7)
/// - `SENDGRID_API_KEY`: Email provider key (optional; emails off without it)
/// - `EMAIL_FROM`: Sender address for account emails
/// - `EMAIL_ENDPOINT`: Email provider endpoint

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use taskvault_shared::email::MailerConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session/auth configuration
    pub auth: AuthConfig,

    /// Email configuration
    pub email: EmailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session/auth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for session token signing
    ///
    /// Must be at least 32 characters. Generate with:
    /// `openssl rand -hex 32`
    pub jwt_secret: String,

    /// How long an issued session stays valid, in days
    pub session_ttl_days: i64,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Provider API key; emails are disabled when absent
    pub api_key: Option<String>,

    /// Sender address
    pub from: String,

    /// Provider endpoint
    pub endpoint: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or malformed,
    /// or if `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let session_ttl_days = env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()?;
        if session_ttl_days <= 0 {
            anyhow::bail!("SESSION_TTL_DAYS must be positive");
        }

        let mailer_defaults = MailerConfig::default();
        let email_api_key = env::var("SENDGRID_API_KEY").ok().filter(|key| !key.is_empty());
        let email_from = env::var("EMAIL_FROM").unwrap_or(mailer_defaults.from);
        let email_endpoint = env::var("EMAIL_ENDPOINT").unwrap_or(mailer_defaults.endpoint);

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                session_ttl_days,
            },
            email: EmailConfig {
                api_key: email_api_key,
                from: email_from,
                endpoint: email_endpoint,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Returns the session validity window as a duration
    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.auth.session_ttl_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                session_ttl_days: 7,
            },
            email: EmailConfig {
                api_key: None,
                from: "no-reply@taskvault.dev".to_string(),
                endpoint: "https://api.sendgrid.com/v3/mail/send".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample_config().bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_session_ttl_is_days() {
        assert_eq!(sample_config().session_ttl(), Duration::days(7));
    }
}
