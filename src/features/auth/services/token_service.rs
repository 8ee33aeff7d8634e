use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::models::{User, UserRole};

/// Claims carried in the session JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Expiry as unix timestamp
    pub exp: i64,
    pub iat: i64,
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_secs: config.jwt_expiry.as_secs() as i64,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: now + self.expiry_secs,
            iat: now,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(data.claims)
    }

    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a-test-secret-that-is-long-enough-0123".to_string(),
            jwt_expiry: Duration::from_secs(3600),
            cookie_domain: None,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "max@example.com".to_string(),
            password_hash: String::new(),
            vorname: "Max".to_string(),
            nachname: "Mustermann".to_string(),
            role: UserRole::Anwalt,
            is_active: true,
            activation_token: None,
            activation_token_expires: None,
            reset_token: None,
            reset_token_expires: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = TokenService::new(&config());
        let user = user();

        let token = service.issue(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "max@example.com");
        assert_eq!(claims.role, UserRole::Anwalt);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new(&config());
        let mut token = service.issue(&user()).unwrap();
        token.push('x');

        assert!(matches!(
            service.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let service = TokenService::new(&config());
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "another-secret-that-is-long-enough-456".to_string(),
            jwt_expiry: Duration::from_secs(3600),
            cookie_domain: None,
        });

        let token = other.issue(&user()).unwrap();
        assert!(service.verify(&token).is_err());
    }
}
