use crate::features::requests::dtos::AnfrageResponseDto;
use crate::features::requests::models::{AnfrageDetails, AnfrageTyp};

/// Absent values render as an em-dash placeholder. Formatting convention
/// only, validation happens at intake.
pub const PLACEHOLDER: &str = "—";

/// Human-readable variant name used in subjects, titles and filenames
pub fn variant_name(typ: AnfrageTyp) -> &'static str {
    match typ {
        AnfrageTyp::Bussgeld => "Bußgeld",
        AnfrageTyp::Verkehrsunfall => "Verkehrsunfall",
        AnfrageTyp::KfzGutachten => "Kfz-Gutachten",
    }
}

fn dash(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn ja_nein(value: bool) -> String {
    if value { "Ja" } else { "Nein" }.to_string()
}

fn joined(parts: &[&Option<String>]) -> String {
    let joined: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.as_deref().map(str::trim))
        .filter(|p| !p.is_empty())
        .collect();
    if joined.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        joined.join(", ")
    }
}

fn flags(pairs: &[(&'static str, bool)]) -> String {
    let active: Vec<&str> = pairs
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| *name)
        .collect();
    if active.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        active.join(", ")
    }
}

/// Build the ordered (label, value) list for the summary PDF and the
/// operations email table. The order is fixed per variant.
pub fn summary_fields(anfrage: &AnfrageResponseDto) -> Vec<(&'static str, String)> {
    let mut fields: Vec<(&'static str, String)> = vec![
        ("Anrede", dash(&anfrage.anrede)),
        ("Titel", dash(&anfrage.titel)),
        ("Vorname", anfrage.vorname.clone()),
        ("Nachname", anfrage.nachname.clone()),
        ("E-Mail", anfrage.email.clone()),
        ("Telefon", dash(&anfrage.telefon)),
        ("Straße", anfrage.strasse.clone()),
        ("Hausnummer", dash(&anfrage.hausnummer)),
        ("PLZ", anfrage.plz.clone()),
        ("Ort", anfrage.ort.clone()),
    ];

    match &anfrage.details {
        AnfrageDetails::Bussgeld(d) => {
            fields.extend([
                ("Aktenzeichen", dash(&d.aktenzeichen)),
                ("Zustellungsdatum", dash(&d.zustellungsdatum)),
                ("Behörde", dash(&d.behoerde)),
                ("Kennzeichen", dash(&d.kennzeichen)),
                ("Vorwurf", dash(&d.vorwurf)),
                ("Fahrzeugtyp", dash(&d.fahrzeug_typ)),
                ("Punktestand", dash(&d.punktestand)),
                ("Probezeit", dash(&d.probezeit)),
                ("Schreiben", dash(&d.schreiben)),
                ("Kostenübernahme", dash(&d.kostenuebernahme)),
            ]);
        }
        AnfrageDetails::Verkehrsunfall(d) => {
            let unfallort = format!(
                "{}, {} {}",
                dash(&d.strasse),
                dash(&d.plz),
                anfrage.ort
            );
            fields.extend([
                ("Unfallverursacher", dash(&d.unfallverursacher)),
                ("Unfalldatum", dash(&d.unfall_datum)),
                ("Unfallzeit", dash(&d.unfall_zeit)),
                ("Unfallort", unfallort),
                ("Weitere Angaben", dash(&d.weitere_angaben)),
                ("Unfallhergang", dash(&d.unfallhergang)),
                (
                    "Reaktion",
                    flags(&[
                        ("gebremst", d.reaktion.gebremst),
                        ("ausgewichen", d.reaktion.ausgewichen),
                        ("keine Reaktion", d.reaktion.keine_reaktion),
                    ]),
                ),
                (
                    "Verkehrszeichen",
                    flags(&[
                        ("Ampel", d.verkehrszeichen.ampel),
                        ("Verkehrsschild", d.verkehrszeichen.verkehrsschild),
                        ("keine", d.verkehrszeichen.keine),
                    ]),
                ),
                (
                    "Fahrzeug",
                    joined(&[
                        &d.fahrzeug_details.marke_modell,
                        &d.fahrzeug_details.kennzeichen,
                        &d.fahrzeug_details.farbe,
                    ]),
                ),
                ("Erstzulassung", dash(&d.fahrzeug_details.erstzulassung)),
                ("Weitere Schäden", dash(&d.fahrzeug_details.weitere_schaeden)),
                ("Polizei verständigt", dash(&d.polizei.verstaendigt)),
                (
                    "Polizeibericht",
                    if d.polizei.polizeibericht.is_empty() {
                        "Nein".to_string()
                    } else {
                        "Ja".to_string()
                    },
                ),
                ("Zeugen vorhanden", dash(&d.zeugen.vorhanden)),
                ("Zeugendetails", dash(&d.zeugen.details)),
                ("Personenschaden", dash(&d.personenschaden)),
                ("Rettungsdienst", dash(&d.rettungsdienst)),
            ]);
        }
        AnfrageDetails::KfzGutachten(d) => {
            fields.extend([
                ("Fahrzeugtyp", dash(&d.fahrzeug_typ)),
                ("Marke", dash(&d.marke)),
                ("Modell", dash(&d.modell)),
                ("Baujahr", dash(&d.baujahr)),
                ("Kennzeichen", dash(&d.kennzeichen)),
                ("Schadensart", dash(&d.schadensart)),
                ("Schadensbeschreibung", dash(&d.schadensbeschreibung)),
                ("Versicherung", dash(&d.versicherung.name)),
                (
                    "Versicherungsnummer",
                    dash(&d.versicherung.versicherungsnummer),
                ),
            ]);
        }
    }

    fields.push(("DSGVO-Einwilligung", ja_nein(anfrage.datenschutz)));
    fields.push(("Anwalt-Einwilligung", ja_nein(anfrage.anwalt_einwilligung)));

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::requests::models::{AnfrageStatus, BussgeldDetails, VerkehrsunfallDetails};
    use chrono::Utc;
    use uuid::Uuid;

    fn base_anfrage(details: AnfrageDetails, typ: AnfrageTyp) -> AnfrageResponseDto {
        AnfrageResponseDto {
            id: Uuid::new_v4(),
            anfrage_typ: typ,
            anrede: Some("Herr".to_string()),
            titel: None,
            vorname: "Max".to_string(),
            nachname: "Mustermann".to_string(),
            email: "max@example.com".to_string(),
            telefon: None,
            strasse: "Hauptstrasse".to_string(),
            hausnummer: Some("12".to_string()),
            plz: "50667".to_string(),
            ort: "Köln".to_string(),
            details,
            dokumente: vec![],
            datenschutz: true,
            anwalt_einwilligung: false,
            status: AnfrageStatus::Neu,
            erstellt_am: Utc::now(),
            aktualisiert_am: Utc::now(),
        }
    }

    #[test]
    fn test_absent_values_render_as_placeholder() {
        let anfrage = base_anfrage(
            AnfrageDetails::Bussgeld(BussgeldDetails::default()),
            AnfrageTyp::Bussgeld,
        );
        let fields = summary_fields(&anfrage);

        let telefon = fields.iter().find(|(l, _)| *l == "Telefon").unwrap();
        assert_eq!(telefon.1, PLACEHOLDER);
        let vorwurf = fields.iter().find(|(l, _)| *l == "Vorwurf").unwrap();
        assert_eq!(vorwurf.1, PLACEHOLDER);
    }

    #[test]
    fn test_field_order_starts_with_contact_and_ends_with_consents() {
        let anfrage = base_anfrage(
            AnfrageDetails::Verkehrsunfall(VerkehrsunfallDetails::default()),
            AnfrageTyp::Verkehrsunfall,
        );
        let fields = summary_fields(&anfrage);

        assert_eq!(fields.first().unwrap().0, "Anrede");
        assert_eq!(fields[fields.len() - 2].0, "DSGVO-Einwilligung");
        assert_eq!(fields.last().unwrap().0, "Anwalt-Einwilligung");
        assert_eq!(fields.last().unwrap().1, "Nein");
    }

    #[test]
    fn test_reaction_flags_joined() {
        let mut details = VerkehrsunfallDetails::default();
        details.reaktion.gebremst = true;
        details.reaktion.ausgewichen = true;

        let anfrage = base_anfrage(
            AnfrageDetails::Verkehrsunfall(details),
            AnfrageTyp::Verkehrsunfall,
        );
        let fields = summary_fields(&anfrage);

        let reaktion = fields.iter().find(|(l, _)| *l == "Reaktion").unwrap();
        assert_eq!(reaktion.1, "gebremst, ausgewichen");
    }
}
