//! Email template rendering using Jinja2 syntax.
//!
//! Templates are compiled into the binary; the environment is built once
//! on first use.

use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

use crate::core::error::{AppError, Result};

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    (
        "customer_confirmation.html",
        include_str!("../../templates/emails/customer_confirmation.html"),
    ),
    (
        "team_notification.html",
        include_str!("../../templates/emails/team_notification.html"),
    ),
    (
        "account_activation.html",
        include_str!("../../templates/emails/account_activation.html"),
    ),
    (
        "password_reset.html",
        include_str!("../../templates/emails/password_reset.html"),
    ),
    (
        "welcome.html",
        include_str!("../../templates/emails/welcome.html"),
    ),
    (
        "faq_team.html",
        include_str!("../../templates/emails/faq_team.html"),
    ),
    (
        "faq_confirmation.html",
        include_str!("../../templates/emails/faq_confirmation.html"),
    ),
];

fn environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        for (name, content) in TEMPLATES {
            // Embedded templates are compile-time constants; a parse
            // failure here is a programming error.
            env.add_template(name, content)
                .unwrap_or_else(|e| panic!("invalid embedded template {}: {}", name, e));
        }
        env
    })
}

/// Render an embedded email template with the given context
pub fn render_email<S: Serialize>(name: &str, ctx: S) -> Result<String> {
    let template = environment()
        .get_template(name)
        .map_err(|e| AppError::Internal(format!("Unknown email template {}: {}", name, e)))?;

    template
        .render(ctx)
        .map_err(|e| AppError::Internal(format!("Failed to render template {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_embedded_templates_compile() {
        for (name, _) in TEMPLATES {
            assert!(environment().get_template(name).is_ok());
        }
    }

    #[test]
    fn test_customer_confirmation_renders_fields() {
        let html = render_email(
            "customer_confirmation.html",
            context! {
                has_logo => true,
                variant_name => "Bußgeld",
                vorname => "Max",
                nachname => "Mustermann",
                fields => vec![context! { label => "Vorwurf", value => "Geschwindigkeit" }],
                attachment_count => 2,
            },
        )
        .unwrap();

        assert!(html.contains("Bußgeld-Anfrage"));
        assert!(html.contains("cid:rechtlylogo"));
        assert!(html.contains("<b>Vorwurf:</b> Geschwindigkeit"));
        assert!(html.contains("2 Datei(en)"));
    }

    #[test]
    fn test_logo_markup_omitted_without_logo() {
        let html = render_email(
            "team_notification.html",
            context! {
                has_logo => false,
                variant_name => "Verkehrsunfall",
                fields => Vec::<minijinja::Value>::new(),
                attachment_count => 0,
                eingegangen_am => "29.08.2026, 10:00",
            },
        )
        .unwrap();

        assert!(!html.contains("cid:rechtlylogo"));
        assert!(html.contains("Eingegangen am: 29.08.2026, 10:00"));
    }
}
