use axum::{routing::post, Router};
use std::sync::Arc;

use crate::features::contact::handlers::faq_contact;
use crate::features::contact::services::ContactService;

/// Public FAQ contact route
pub fn routes(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/api/faq-contact", post(faq_contact))
        .with_state(service)
}
