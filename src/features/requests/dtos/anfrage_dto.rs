use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::requests::models::{
    Anfrage, AnfrageDetails, AnfrageStatus, AnfrageTyp, BussgeldDetails, DokumentRef,
    KfzGutachtenDetails, VerkehrsunfallDetails,
};

/// Coerce a consent flag from boolean or the string "true".
///
/// The historical web forms sent either; anything other than `true` /
/// `"true"` counts as not consented.
fn coerce_consent<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s == "true",
        _ => false,
    }))
}

/// Submission body for all three intake variants.
///
/// The route path selects the variant; the matching payload field is used
/// and the other two are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnfrageDto {
    pub anrede: Option<String>,
    pub titel: Option<String>,
    pub vorname: Option<String>,
    pub nachname: Option<String>,
    pub email: Option<String>,
    pub telefon: Option<String>,
    pub strasse: Option<String>,
    pub hausnummer: Option<String>,
    pub plz: Option<String>,
    pub ort: Option<String>,

    pub bussgeld: Option<BussgeldDetails>,
    pub verkehrsunfall: Option<VerkehrsunfallDetails>,
    pub kfz_gutachten: Option<KfzGutachtenDetails>,

    /// Ids of previously uploaded documents to attach
    #[serde(default)]
    pub dokument_ids: Vec<Uuid>,

    #[serde(default, deserialize_with = "coerce_consent")]
    #[schema(value_type = Option<bool>)]
    pub dsgvo_einwilligung: Option<bool>,

    #[serde(default, deserialize_with = "coerce_consent")]
    #[schema(value_type = Option<bool>)]
    pub anwalt_einwilligung: Option<bool>,
}

impl SubmitAnfrageDto {
    /// Pick the variant payload matching the submitted type; missing
    /// payloads become an empty payload of that variant.
    pub fn details_for(&self, typ: AnfrageTyp) -> AnfrageDetails {
        match typ {
            AnfrageTyp::Bussgeld => {
                AnfrageDetails::Bussgeld(self.bussgeld.clone().unwrap_or_default())
            }
            AnfrageTyp::Verkehrsunfall => {
                AnfrageDetails::Verkehrsunfall(self.verkehrsunfall.clone().unwrap_or_default())
            }
            AnfrageTyp::KfzGutachten => {
                AnfrageDetails::KfzGutachten(self.kfz_gutachten.clone().unwrap_or_default())
            }
        }
    }
}

/// Response DTO carrying the id of a stored submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultDto {
    pub anfrage_id: Uuid,
}

/// Full intake request representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnfrageResponseDto {
    pub id: Uuid,
    pub anfrage_typ: AnfrageTyp,
    pub anrede: Option<String>,
    pub titel: Option<String>,
    pub vorname: String,
    pub nachname: String,
    pub email: String,
    pub telefon: Option<String>,
    pub strasse: String,
    pub hausnummer: Option<String>,
    pub plz: String,
    pub ort: String,
    pub details: AnfrageDetails,
    pub dokumente: Vec<DokumentRef>,
    pub datenschutz: bool,
    pub anwalt_einwilligung: bool,
    pub status: AnfrageStatus,
    pub erstellt_am: DateTime<Utc>,
    pub aktualisiert_am: DateTime<Utc>,
}

impl From<Anfrage> for AnfrageResponseDto {
    fn from(anfrage: Anfrage) -> Self {
        Self {
            id: anfrage.id,
            anfrage_typ: anfrage.anfrage_typ,
            anrede: anfrage.anrede,
            titel: anfrage.titel,
            vorname: anfrage.vorname,
            nachname: anfrage.nachname,
            email: anfrage.email,
            telefon: anfrage.telefon,
            strasse: anfrage.strasse,
            hausnummer: anfrage.hausnummer,
            plz: anfrage.plz,
            ort: anfrage.ort,
            details: anfrage.details.0,
            dokumente: anfrage.dokumente.0,
            datenschutz: anfrage.datenschutz,
            anwalt_einwilligung: anfrage.anwalt_einwilligung,
            status: anfrage.status,
            erstellt_am: anfrage.erstellt_am,
            aktualisiert_am: anfrage.aktualisiert_am,
        }
    }
}

/// Patch body for updating a stored submission
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnfrageDto {
    pub status: Option<AnfrageStatus>,
    /// Replacement variant payload; must carry the same `anfrageTyp` tag
    pub details: Option<AnfrageDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consent_coercion_accepts_bool_and_string() {
        let dto: SubmitAnfrageDto =
            serde_json::from_str(r#"{"dsgvoEinwilligung": true, "anwaltEinwilligung": "true"}"#)
                .unwrap();
        assert_eq!(dto.dsgvo_einwilligung, Some(true));
        assert_eq!(dto.anwalt_einwilligung, Some(true));

        let dto: SubmitAnfrageDto =
            serde_json::from_str(r#"{"dsgvoEinwilligung": "yes", "anwaltEinwilligung": false}"#)
                .unwrap();
        assert_eq!(dto.dsgvo_einwilligung, Some(false));
        assert_eq!(dto.anwalt_einwilligung, Some(false));

        let dto: SubmitAnfrageDto = serde_json::from_str("{}").unwrap();
        assert_eq!(dto.dsgvo_einwilligung, None);
        assert_eq!(dto.anwalt_einwilligung, None);
    }

    #[test]
    fn test_details_for_uses_route_variant() {
        let dto: SubmitAnfrageDto = serde_json::from_str(
            r#"{
                "vorname": "Max",
                "bussgeld": {"vorwurf": "Geschwindigkeit"},
                "kfzGutachten": {"marke": "VW"}
            }"#,
        )
        .unwrap();

        // The route decides the variant even when several payloads are sent.
        match dto.details_for(AnfrageTyp::Bussgeld) {
            AnfrageDetails::Bussgeld(d) => {
                assert_eq!(d.vorwurf.as_deref(), Some("Geschwindigkeit"))
            }
            other => panic!("expected bussgeld details, got {:?}", other),
        }

        match dto.details_for(AnfrageTyp::Verkehrsunfall) {
            AnfrageDetails::Verkehrsunfall(d) => assert!(d.unfallverursacher.is_none()),
            other => panic!("expected empty verkehrsunfall details, got {:?}", other),
        }
    }
}
