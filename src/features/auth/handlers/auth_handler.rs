use axum::{
    extract::{Path, State},
    http::header::SET_COOKIE,
    response::AppendHeaders,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    ForgotPasswordDto, LoginDto, LoginResponseDto, RegisterDto, ResetPasswordDto, UserResponseDto,
};
use crate::features::auth::services::{AuthService, Claims, TokenService};
use crate::shared::types::ApiResponse;

pub const SESSION_COOKIE: &str = "rechtly_session";

/// Shared state for the auth routes
#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService>,
    pub tokens: TokenService,
    pub cookie_domain: Option<String>,
}

impl AuthState {
    fn session_cookie(&self, token: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, token, max_age_secs
        );
        if let Some(domain) = &self.cookie_domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        cookie
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 200, description = "Account created, activation mail sent", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    AppJson(dto): AppJson<RegisterDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.auth.register(dto).await?;

    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from(user)),
        Some("Registrierung erfolgreich. Bitte prüfen Sie Ihre E-Mails".to_string()),
        None,
    )))
}

/// Activate an account via the emailed token
#[utoipa::path(
    get,
    path = "/api/auth/activate/{token}",
    tag = "auth",
    params(("token" = String, Path, description = "Activation token from the email")),
    responses(
        (status = 200, description = "Account activated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Token invalid or expired")
    )
)]
pub async fn activate(
    State(state): State<AuthState>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<UserResponseDto>>, AppError> {
    let user = state.auth.activate(&token).await?;

    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from(user)),
        Some("Konto erfolgreich aktiviert".to_string()),
        None,
    )))
}

/// Log in with email and password
///
/// Returns a bearer token and additionally sets it as an httpOnly session
/// cookie for browser clients.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 401, description = "Wrong credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    AppJson(dto): AppJson<LoginDto>,
) -> Result<
    (
        AppendHeaders<[(axum::http::HeaderName, String); 1]>,
        Json<ApiResponse<LoginResponseDto>>,
    ),
    AppError,
> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.auth.login(dto).await?;
    let token = state.tokens.issue(&user)?;
    let cookie = state.session_cookie(&token, state.tokens.expiry_secs());

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ApiResponse::success(
            Some(LoginResponseDto {
                token,
                user: UserResponseDto::from(user),
            }),
            None,
            None,
        )),
    ))
}

/// Log out by clearing the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(
    State(state): State<AuthState>,
) -> (
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<ApiResponse<()>>,
) {
    let cookie = state.session_cookie("", 0);

    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ApiResponse::success(
            None,
            Some("Abgemeldet".to_string()),
            None,
        )),
    )
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordDto,
    responses(
        (status = 200, description = "Reset mail sent if the address is registered")
    )
)]
pub async fn forgot_password(
    State(state): State<AuthState>,
    AppJson(dto): AppJson<ForgotPasswordDto>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.auth.forgot_password(&dto.email).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some(
            "Falls ein Konto mit dieser Adresse existiert, wurde eine E-Mail versendet"
                .to_string(),
        ),
        None,
    )))
}

/// Set a new password via the emailed reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    tag = "auth",
    params(("token" = String, Path, description = "Reset token from the email")),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Token invalid or expired")
    )
)]
pub async fn reset_password(
    State(state): State<AuthState>,
    Path(token): Path<String>,
    AppJson(dto): AppJson<ResetPasswordDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.auth.reset_password(&token, dto).await?;

    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from(user)),
        Some("Passwort erfolgreich geändert".to_string()),
        None,
    )))
}

/// Current account, resolved from the verified token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current account", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Missing or invalid credentials")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AuthState>,
    claims: Claims,
) -> Result<Json<ApiResponse<UserResponseDto>>, AppError> {
    let user = state.auth.get_by_id(claims.sub).await?;

    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from(user)),
        None,
        None,
    )))
}
