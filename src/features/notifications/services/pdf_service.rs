use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};
use std::io::Cursor;
use tracing::warn;

use crate::core::error::{AppError, Result};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 25.0;
const COL1_WIDTH: f32 = 60.0;
const COL2_WIDTH: f32 = 100.0;
const ROW_HEIGHT: f32 = 7.0;
const LOGO_WIDTH: f32 = 40.0;

/// Render the one-page tabular summary of a submission.
///
/// Layout: optional centered logo, bold title, then a two-column table
/// (field label, value) at fixed row height. Returns the PDF bytes.
pub fn render_summary_pdf(
    title: &str,
    fields: &[(&str, String)],
    logo_png: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Summary");
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(format!("PDF font setup failed: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(format!("PDF font setup failed: {}", e)))?;

    let mut y = PAGE_HEIGHT - 20.0;

    if let Some(bytes) = logo_png {
        // A broken logo must never block the summary itself.
        match embed_logo(&layer, bytes, y) {
            Ok(()) => y -= 22.0,
            Err(e) => warn!("Skipping summary logo: {}", e),
        }
    }

    layer.use_text(title, 18.0, Mm(centered_x(title, 18.0)), Mm(y), &bold);
    y -= 14.0;

    layer.set_outline_color(Color::Rgb(Rgb::new(0.8, 0.8, 0.8, None)));
    layer.set_outline_thickness(0.4);

    draw_row(&layer, y, "Feld", "Wert", &bold, 11.0);
    y -= ROW_HEIGHT;

    for (label, value) in fields {
        draw_row(&layer, y, label, value, &font, 10.0);
        y -= ROW_HEIGHT;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(format!("PDF serialization failed: {}", e)))
}

/// Helvetica has no embedded metrics here; 0.5 em average glyph width is
/// close enough for centering a short title.
fn centered_x(text: &str, font_size_pt: f32) -> f32 {
    let glyph_width_mm = font_size_pt * 0.5 * 0.3528;
    let text_width = text.chars().count() as f32 * glyph_width_mm;
    ((PAGE_WIDTH - text_width) / 2.0).max(MARGIN_LEFT)
}

fn draw_row(
    layer: &PdfLayerReference,
    y: f32,
    label: &str,
    value: &str,
    font: &IndirectFontRef,
    font_size: f32,
) {
    let col2_left = MARGIN_LEFT + COL1_WIDTH;

    layer.add_rect(
        Rect::new(Mm(MARGIN_LEFT), Mm(y - ROW_HEIGHT), Mm(col2_left), Mm(y))
            .with_mode(PaintMode::Stroke),
    );
    layer.add_rect(
        Rect::new(
            Mm(col2_left),
            Mm(y - ROW_HEIGHT),
            Mm(col2_left + COL2_WIDTH),
            Mm(y),
        )
        .with_mode(PaintMode::Stroke),
    );

    let baseline = y - ROW_HEIGHT + 2.2;
    layer.use_text(label, font_size, Mm(MARGIN_LEFT + 2.5), Mm(baseline), font);
    layer.use_text(value, font_size, Mm(col2_left + 2.5), Mm(baseline), font);
}

fn embed_logo(layer: &PdfLayerReference, bytes: &[u8], top_y: f32) -> Result<()> {
    use printpdf::image_crate::codecs::png::PngDecoder;
    use printpdf::{Image, ImageTransform};

    let decoder = PngDecoder::new(Cursor::new(bytes))
        .map_err(|e| AppError::Internal(format!("logo decode failed: {}", e)))?;
    let image = Image::try_from(decoder)
        .map_err(|e| AppError::Internal(format!("logo decode failed: {}", e)))?;

    let natural_width_mm = image.image.width.0 as f32 * 25.4 / 300.0;
    let scale = if natural_width_mm > 0.0 {
        LOGO_WIDTH / natural_width_mm
    } else {
        1.0
    };

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm((PAGE_WIDTH - LOGO_WIDTH) / 2.0)),
            translate_y: Some(Mm(top_y - 15.0)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(300.0),
            ..Default::default()
        },
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_valid_pdf_bytes() {
        let fields = vec![
            ("Vorname", "Max".to_string()),
            ("Nachname", "Mustermann".to_string()),
            ("Telefon", "—".to_string()),
        ];

        let bytes = render_summary_pdf("Bußgeld-Anfrage Übersicht", &fields, None).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_garbage_logo_is_skipped_not_fatal() {
        let fields = vec![("Vorname", "Max".to_string())];

        let bytes =
            render_summary_pdf("Übersicht", &fields, Some(b"definitely not a png")).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }
}
