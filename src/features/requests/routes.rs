use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::requests::handlers::{
    get_anfrage, list_anfragen, submit_bussgeld, submit_kfz_gutachten, submit_verkehrsunfall,
    update_anfrage,
};
use crate::features::requests::services::AnfrageService;

/// Public submission routes, one per intake variant
pub fn public_routes(service: Arc<AnfrageService>) -> Router {
    Router::new()
        .route("/api/anfrage/bussgeld", post(submit_bussgeld))
        .route("/api/anfrage/verkehrsunfall", post(submit_verkehrsunfall))
        .route("/api/anfrage/kfz-gutachten", post(submit_kfz_gutachten))
        .with_state(service)
}

/// Back-office routes; the auth middleware is layered on top in `main`
pub fn protected_routes(service: Arc<AnfrageService>) -> Router {
    Router::new()
        .route("/api/anfrage", get(list_anfragen))
        .route("/api/anfrage/{id}", get(get_anfrage).put(update_anfrage))
        .with_state(service)
}
