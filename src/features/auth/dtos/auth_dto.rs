use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::models::{User, UserRole};

/// Request DTO for account registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDto {
    #[validate(email(message = "E-Mail-Adresse ist ungültig"))]
    pub email: String,

    #[validate(length(min = 8, message = "Passwort muss mindestens 8 Zeichen lang sein"))]
    pub password: String,

    #[validate(length(min = 1, max = 128, message = "Vorname ist erforderlich"))]
    pub vorname: String,

    #[validate(length(min = 1, max = 128, message = "Nachname ist erforderlich"))]
    pub nachname: String,
}

/// Request DTO for login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    #[validate(email(message = "E-Mail-Adresse ist ungültig"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordDto {
    #[validate(email(message = "E-Mail-Adresse ist ungültig"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordDto {
    #[validate(length(min = 8, message = "Passwort muss mindestens 8 Zeichen lang sein"))]
    pub password: String,
}

/// Public account representation
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    pub id: Uuid,
    pub email: String,
    pub vorname: String,
    pub nachname: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            vorname: user.vorname,
            nachname: user.nachname,
            role: user.role,
            is_active: user.is_active,
            last_login: user.last_login,
        }
    }
}

/// Successful login payload: bearer token plus account data
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseDto {
    pub token: String,
    pub user: UserResponseDto,
}
