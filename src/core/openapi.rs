use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::dtos as auth_dtos;
use crate::features::auth::handlers as auth_handlers;
use crate::features::auth::models::UserRole;
use crate::features::contact::dtos as contact_dtos;
use crate::features::contact::handlers as contact_handlers;
use crate::features::requests::dtos as requests_dtos;
use crate::features::requests::handlers as requests_handlers;
use crate::features::requests::models as requests_models;
use crate::features::uploads::dtos as uploads_dtos;
use crate::features::uploads::handlers as uploads_handlers;
use crate::features::uploads::models::DokumentArt;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Uploads
        uploads_handlers::upload_files,
        uploads_handlers::delete_document,
        // Anfragen
        requests_handlers::submit_bussgeld,
        requests_handlers::submit_verkehrsunfall,
        requests_handlers::submit_kfz_gutachten,
        requests_handlers::list_anfragen,
        requests_handlers::get_anfrage,
        requests_handlers::update_anfrage,
        // Auth
        auth_handlers::register,
        auth_handlers::activate,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::forgot_password,
        auth_handlers::reset_password,
        auth_handlers::me,
        // Contact
        contact_handlers::faq_contact,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Uploads
            DokumentArt,
            uploads_dtos::UploadRequestDto,
            uploads_dtos::AcceptedFileDto,
            uploads_dtos::RejectedFileDto,
            uploads_dtos::UploadResultDto,
            uploads_dtos::DeleteDocumentResponseDto,
            ApiResponse<uploads_dtos::UploadResultDto>,
            ApiResponse<uploads_dtos::DeleteDocumentResponseDto>,
            // Anfragen
            requests_models::AnfrageTyp,
            requests_models::AnfrageStatus,
            requests_models::AnfrageDetails,
            requests_models::BussgeldDetails,
            requests_models::VerkehrsunfallDetails,
            requests_models::KfzGutachtenDetails,
            requests_models::DokumentRef,
            requests_dtos::SubmitAnfrageDto,
            requests_dtos::SubmitResultDto,
            requests_dtos::AnfrageResponseDto,
            requests_dtos::UpdateAnfrageDto,
            ApiResponse<requests_dtos::SubmitResultDto>,
            ApiResponse<requests_dtos::AnfrageResponseDto>,
            ApiResponse<Vec<requests_dtos::AnfrageResponseDto>>,
            // Auth
            UserRole,
            auth_dtos::RegisterDto,
            auth_dtos::LoginDto,
            auth_dtos::ForgotPasswordDto,
            auth_dtos::ResetPasswordDto,
            auth_dtos::UserResponseDto,
            auth_dtos::LoginResponseDto,
            ApiResponse<auth_dtos::UserResponseDto>,
            ApiResponse<auth_dtos::LoginResponseDto>,
            // Contact
            contact_dtos::FaqContactDto,
        )
    ),
    tags(
        (name = "uploads", description = "Document upload and deletion"),
        (name = "anfragen", description = "Intake request submission and back-office management"),
        (name = "auth", description = "Account registration, activation, login and password reset"),
        (name = "contact", description = "FAQ contact form relay"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Rechtly API",
        version = "0.1.0",
        description = "Backend for the Rechtly legal services intake platform",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every handler listed in paths() must resolve through its module's
    // re-exports; a missing path here means a mod.rs stopped re-exporting
    // the generated path item.
    #[test]
    fn test_api_doc_registers_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for expected in [
            "/api/upload",
            "/api/upload/{fileId}",
            "/api/anfrage/bussgeld",
            "/api/anfrage/verkehrsunfall",
            "/api/anfrage/kfz-gutachten",
            "/api/anfrage",
            "/api/anfrage/{id}",
            "/api/auth/register",
            "/api/auth/activate/{token}",
            "/api/auth/login",
            "/api/auth/logout",
            "/api/auth/forgot-password",
            "/api/auth/reset-password/{token}",
            "/api/auth/me",
            "/api/faq-contact",
        ] {
            assert!(paths.contains_key(expected), "missing path {}", expected);
        }
    }
}
