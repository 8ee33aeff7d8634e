use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// FAQ contact form payload. Every field is required.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FaqContactDto {
    #[validate(length(min = 1, max = 128, message = "Vorname ist erforderlich"))]
    pub vorname: String,

    #[validate(length(min = 1, max = 128, message = "Nachname ist erforderlich"))]
    pub nachname: String,

    #[validate(email(message = "E-Mail-Adresse ist ungültig"))]
    pub email: String,

    #[validate(length(min = 1, max = 64, message = "Telefon ist erforderlich"))]
    pub telefon: String,

    #[validate(length(min = 1, max = 4000, message = "Nachricht ist erforderlich"))]
    pub nachricht: String,
}
