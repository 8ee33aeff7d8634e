use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use chrono::{Duration, Utc};
use minijinja::context;
use rand::RngCore;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginDto, RegisterDto, ResetPasswordDto};
use crate::features::auth::models::User;
use crate::modules::mailer::{Mailer, OutgoingEmail};
use crate::shared::templates::render_email;

const ACTIVATION_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;

/// Hash a password with Argon2id and a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC hash string
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Corrupt password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Random 256-bit token, hex encoded. Used for activation and reset links.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Account lifecycle: registration with email activation, login,
/// password reset. Lifecycle emails go out synchronously.
pub struct AuthService {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl AuthService {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, frontend_url: String) -> Self {
        Self {
            pool,
            mailer,
            frontend_url,
        }
    }

    /// Create an inactive account and send the activation link.
    pub async fn register(&self, dto: RegisterDto) -> Result<User> {
        let email = dto.email.trim().to_lowercase();

        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "Ein Konto mit dieser E-Mail-Adresse existiert bereits".to_string(),
            ));
        }

        let password_hash = hash_password(&dto.password)?;
        let activation_token = generate_token();
        let expires = Utc::now() + Duration::hours(ACTIVATION_TOKEN_HOURS);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, vorname, nachname, activation_token, activation_token_expires)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(dto.vorname.trim())
        .bind(dto.nachname.trim())
        .bind(&activation_token)
        .bind(expires)
        .fetch_one(&self.pool)
        .await?;

        let activation_url = format!("{}/activate/{}", self.frontend_url, activation_token);
        let html = render_email(
            "account_activation.html",
            context! { activation_url => activation_url },
        )?;
        self.mailer
            .send(OutgoingEmail {
                to: user.email.clone(),
                subject: "Aktivieren Sie Ihr Rechtly-Konto".to_string(),
                html_body: html,
                attachments: vec![],
            })
            .await?;

        info!(user_id = %user.id, "account registered, activation mail sent");
        Ok(user)
    }

    /// Activate an account via its emailed token.
    pub async fn activate(&self, token: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = TRUE, activation_token = NULL, activation_token_expires = NULL,
                updated_at = NOW()
            WHERE activation_token = $1 AND activation_token_expires > NOW()
            RETURNING *
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Aktivierungslink ist ungültig oder abgelaufen".to_string())
        })?;

        // The account is active either way, a lost welcome mail is harmless.
        let login_url = format!("{}/login", self.frontend_url);
        match render_email(
            "welcome.html",
            context! { vorname => user.vorname, login_url => login_url },
        ) {
            Ok(html) => {
                if let Err(e) = self
                    .mailer
                    .send(OutgoingEmail {
                        to: user.email.clone(),
                        subject: "Willkommen bei Rechtly!".to_string(),
                        html_body: html,
                        attachments: vec![],
                    })
                    .await
                {
                    warn!(user_id = %user.id, "welcome mail failed: {}", e);
                }
            }
            Err(e) => warn!("welcome template failed: {}", e),
        }

        Ok(user)
    }

    /// Verify credentials and record the login time.
    pub async fn login(&self, dto: LoginDto) -> Result<User> {
        let email = dto.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Auth("E-Mail oder Passwort ist falsch".to_string()))?;

        if !verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::Auth("E-Mail oder Passwort ist falsch".to_string()));
        }
        if !user.is_active {
            return Err(AppError::Auth(
                "Konto ist noch nicht aktiviert. Bitte prüfen Sie Ihre E-Mails".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Issue a password reset token when the address is known.
    ///
    /// Always succeeds from the caller's perspective so the endpoint does
    /// not leak which addresses have accounts.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user else {
            return Ok(());
        };

        let reset_token = generate_token();
        let expires = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);

        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expires = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(user.id)
        .bind(&reset_token)
        .bind(expires)
        .execute(&self.pool)
        .await?;

        let reset_url = format!("{}/reset-password/{}", self.frontend_url, reset_token);
        let html = render_email("password_reset.html", context! { reset_url => reset_url })?;
        self.mailer
            .send(OutgoingEmail {
                to: user.email.clone(),
                subject: "Passwort zurücksetzen - Rechtly".to_string(),
                html_body: html,
                attachments: vec![],
            })
            .await?;

        Ok(())
    }

    /// Set a new password via a valid reset token.
    pub async fn reset_password(&self, token: &str, dto: ResetPasswordDto) -> Result<User> {
        let password_hash = hash_password(&dto.password)?;

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, reset_token = NULL, reset_token_expires = NULL,
                updated_at = NOW()
            WHERE reset_token = $1 AND reset_token_expires > NOW()
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Reset-Link ist ungültig oder abgelaufen".to_string())
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("korrekt-pferd-batterie").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("korrekt-pferd-batterie", &hash).unwrap());
        assert!(!verify_password("falsches-passwort", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("gleiches-passwort").unwrap();
        let b = hash_password("gleiches-passwort").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
