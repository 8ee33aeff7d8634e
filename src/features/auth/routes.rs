use axum::{
    routing::{get, post},
    Router,
};

use crate::features::auth::handlers::{
    activate, forgot_password, login, logout, me, register, reset_password, AuthState,
};

/// Public auth routes
pub fn public_routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/activate/{token}", get(activate))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password/{token}", post(reset_password))
        .with_state(state)
}

/// Routes requiring a verified session; auth middleware is layered in `main`
pub fn protected_routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/me", get(me))
        .with_state(state)
}
