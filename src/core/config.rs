use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub smtp: SmtpConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// JWT signing configuration (HS256, single shared secret).
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
    /// Parent domain the session cookie is scoped to (e.g. ".rechtly.de").
    pub cookie_domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for document uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing uploaded documents
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
}

/// SMTP mail transport configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Use STARTTLS; plain connection otherwise (local dev relays)
    pub starttls: bool,
    pub from: String,
}

/// Notification dispatch configuration
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Operations mailbox that receives a copy of every intake
    pub ops_mailbox: String,
    /// Optional path to the logo PNG embedded in emails and PDF summaries
    pub logo_path: Option<String>,
    /// Outbox poll interval
    pub poll_interval: Duration,
    /// Attempts before an outbox entry is marked failed
    pub max_attempts: i32,
}

/// Parse an env var into `T`, falling back to `default` when unset.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            smtp: SmtpConfig::from_env()?,
            notifications: NotificationConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env_parse("PORT", 5000)?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            frontend_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Conservative pool defaults for small-medium apps
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: env_parse("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: env_parse("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: env_parse(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: env_parse("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: env_parse("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_EXPIRY_SECS: u64 = 24 * 60 * 60; // 24h

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;
        if jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }

        let jwt_expiry_secs = env_parse("JWT_EXPIRY_SECS", Self::DEFAULT_JWT_EXPIRY_SECS)?;

        let cookie_domain = env::var("SESSION_COOKIE_DOMAIN")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            jwt_secret,
            jwt_expiry: Duration::from_secs(jwt_expiry_secs),
            cookie_domain,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Rechtly API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the Rechtly intake backend".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "rechtly-uploads".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
        })
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("SMTP_HOST").map_err(|_| "SMTP_HOST must be set".to_string())?;

        let port: u16 = env_parse("SMTP_PORT", 587)?;

        let username = env::var("SMTP_USER").ok().filter(|s| !s.is_empty());
        let password = env::var("SMTP_PASS").ok().filter(|s| !s.is_empty());

        let starttls = env::var("SMTP_STARTTLS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let from = env::var("SMTP_FROM").unwrap_or_else(|_| "noreply@rechtly.de".to_string());

        Ok(Self {
            host,
            port,
            username,
            password,
            starttls,
            from,
        })
    }
}

impl NotificationConfig {
    const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
    const DEFAULT_MAX_ATTEMPTS: i32 = 3;

    pub fn from_env() -> Result<Self, String> {
        let ops_mailbox =
            env::var("OPS_MAILBOX").unwrap_or_else(|_| "anfragen@rechtly.de".to_string());

        let logo_path = env::var("NOTIFICATION_LOGO_PATH")
            .ok()
            .filter(|s| !s.is_empty());

        let poll_interval_secs =
            env_parse("OUTBOX_POLL_INTERVAL_SECS", Self::DEFAULT_POLL_INTERVAL_SECS)?;
        let max_attempts = env_parse("OUTBOX_MAX_ATTEMPTS", Self::DEFAULT_MAX_ATTEMPTS)?;

        Ok(Self {
            ops_mailbox,
            logo_path,
            poll_interval: Duration::from_secs(poll_interval_secs),
            max_attempts,
        })
    }
}
