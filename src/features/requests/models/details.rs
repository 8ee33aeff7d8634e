use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Variant payload of an intake request, tagged on `anfrageTyp`.
///
/// Stored as JSONB next to the `anfrage_typ` column; the embedded tag keeps
/// the stored document self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "anfrageTyp", rename_all = "kebab-case")]
pub enum AnfrageDetails {
    Bussgeld(BussgeldDetails),
    Verkehrsunfall(VerkehrsunfallDetails),
    KfzGutachten(KfzGutachtenDetails),
}

/// Fine dispute payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BussgeldDetails {
    pub vorwurf: Option<String>,
    pub fahrzeug_typ: Option<String>,
    pub punktestand: Option<String>,
    pub probezeit: Option<String>,
    pub schreiben: Option<String>,
    pub kostenuebernahme: Option<String>,
    pub aktenzeichen: Option<String>,
    pub zustellungsdatum: Option<String>,
    pub behoerde: Option<String>,
    pub kennzeichen: Option<String>,
}

/// Traffic accident payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerkehrsunfallDetails {
    pub unfallverursacher: Option<String>,
    pub unfall_datum: Option<String>,
    pub unfall_zeit: Option<String>,
    pub strasse: Option<String>,
    pub plz: Option<String>,
    pub weitere_angaben: Option<String>,
    pub unfallhergang: Option<String>,
    #[serde(default)]
    pub reaktion: Reaktion,
    #[serde(default)]
    pub verkehrszeichen: Verkehrszeichen,
    #[serde(default)]
    pub fahrzeug_details: FahrzeugDetails,
    #[serde(default)]
    pub polizei: Polizei,
    #[serde(default)]
    pub zeugen: Zeugen,
    pub personenschaden: Option<String>,
    pub rettungsdienst: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reaktion {
    #[serde(default)]
    pub gebremst: bool,
    #[serde(default)]
    pub ausgewichen: bool,
    #[serde(default)]
    pub keine_reaktion: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verkehrszeichen {
    #[serde(default)]
    pub ampel: bool,
    #[serde(default)]
    pub verkehrsschild: bool,
    #[serde(default)]
    pub keine: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FahrzeugDetails {
    pub marke_modell: Option<String>,
    pub kennzeichen: Option<String>,
    pub farbe: Option<String>,
    pub erstzulassung: Option<String>,
    pub weitere_schaeden: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Polizei {
    pub verstaendigt: Option<String>,
    #[serde(default)]
    pub polizeibericht: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Zeugen {
    pub vorhanden: Option<String>,
    pub details: Option<String>,
}

/// Vehicle damage assessment payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KfzGutachtenDetails {
    pub fahrzeug_typ: Option<String>,
    pub marke: Option<String>,
    pub modell: Option<String>,
    pub baujahr: Option<String>,
    pub kennzeichen: Option<String>,
    pub schadensart: Option<String>,
    pub schadensbeschreibung: Option<String>,
    #[serde(default)]
    pub versicherung: Versicherung,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Versicherung {
    pub name: Option<String>,
    pub versicherungsnummer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_tagged_on_anfrage_typ() {
        let details = AnfrageDetails::KfzGutachten(KfzGutachtenDetails {
            marke: Some("VW".to_string()),
            ..Default::default()
        });

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["anfrageTyp"], "kfz-gutachten");
        assert_eq!(value["marke"], "VW");

        let back: AnfrageDetails = serde_json::from_value(value).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_verkehrsunfall_nested_defaults() {
        // A minimal accident payload deserializes with all nested groups
        // defaulted, matching what the web form sends when sections are
        // left untouched.
        let details: VerkehrsunfallDetails = serde_json::from_str(
            r#"{"unfallverursacher": "anderer", "unfallDatum": "2025-06-12"}"#,
        )
        .unwrap();

        assert_eq!(details.unfallverursacher.as_deref(), Some("anderer"));
        assert!(!details.reaktion.gebremst);
        assert!(details.polizei.polizeibericht.is_empty());
        assert!(details.zeugen.vorhanden.is_none());
    }
}
