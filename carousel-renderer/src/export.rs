//! Deck-to-PDF export pipeline.
//!
//! Renders every slide at a supersampling scale chosen from the deck's total
//! pixel area, encodes each raster as JPEG, and assembles the pages with the
//! in-house PDF writer.

use tiny_skia::Pixmap;

use carousel_core::editor::{Branding, EditorDeck};

use crate::canvas::SlideRenderer;
use crate::error::{RenderError, RenderResult};
use crate::pdf::{build_pdf, PdfPage};

/// Default JPEG quality for exported pages.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Export tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Supersampling scale override; `None` picks one from the deck size.
    pub quality_scale: Option<f32>,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality_scale: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Pick a supersampling scale from the deck's total slide area.
///
/// Small decks get 2x for crisp text; the scale steps down as the area grows
/// so export memory stays bounded.
#[must_use]
pub fn pick_scale(deck: &EditorDeck) -> f32 {
    let total_pixels: f64 = deck
        .slides
        .iter()
        .map(|s| f64::from(s.format.width) * f64::from(s.format.height))
        .sum();
    if total_pixels <= 6_000_000.0 {
        2.0
    } else if total_pixels <= 12_000_000.0 {
        1.5
    } else {
        1.0
    }
}

/// Sanitize a deck title into a downloadable PDF filename.
///
/// Keeps letters, digits, underscores, hyphens, and spaces; truncates to 60
/// characters; falls back to `carousel` for empty results.
#[must_use]
pub fn pdf_filename(title: &str) -> String {
    let mut name: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect();
    name.truncate(60);
    let name = name.trim();
    if name.is_empty() {
        "carousel.pdf".to_string()
    } else {
        format!("{name}.pdf")
    }
}

/// Flatten a premultiplied pixmap over white and encode it as JPEG.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if JPEG encoding fails.
pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> RenderResult<Vec<u8>> {
    let mut rgb = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for px in pixmap.pixels() {
        // Premultiplied src over a white background: c + (255 - a).
        let inv = 255 - px.alpha();
        rgb.extend_from_slice(&[
            px.red().saturating_add(inv),
            px.green().saturating_add(inv),
            px.blue().saturating_add(inv),
        ]);
    }
    let img = image::RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb)
        .ok_or_else(|| RenderError::Export("raster buffer mismatch".to_string()))?;

    let mut out = std::io::Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&img)
        .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;
    Ok(out.into_inner())
}

/// Render every slide and assemble the deck into a single PDF.
///
/// Pages keep their slide-unit dimensions as PDF points; only the embedded
/// raster is supersampled.
///
/// # Errors
///
/// Propagates render, encode, and assembly failures.
pub fn export_deck_to_pdf(
    renderer: &SlideRenderer,
    deck: &EditorDeck,
    branding: &Branding,
    options: &ExportOptions,
) -> RenderResult<Vec<u8>> {
    let scale = options.quality_scale.unwrap_or_else(|| pick_scale(deck));
    tracing::info!(slides = deck.slides.len(), scale, "exporting deck to PDF");

    let mut pages = Vec::with_capacity(deck.slides.len());
    for (idx, slide) in deck.slides.iter().enumerate() {
        let is_last = idx + 1 == deck.slides.len();
        let pixmap = renderer.render_slide(slide, branding, scale, is_last)?;
        let jpeg = encode_jpeg(&pixmap, options.jpeg_quality)?;
        pages.push(PdfPage {
            width: slide.format.width,
            height: slide.format.height,
            px_width: pixmap.width(),
            px_height: pixmap.height(),
            jpeg,
        });
    }

    Ok(build_pdf(&pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::editor::{
        create_id, format_from_preset, EditorSlide, SlideFormatPreset,
    };

    fn deck_with_slides(n: usize, preset: SlideFormatPreset) -> EditorDeck {
        EditorDeck {
            title: "Test Deck".to_string(),
            slides: (0..n)
                .map(|_| EditorSlide {
                    id: create_id("slide"),
                    format: format_from_preset(preset),
                    background_color: "#000012".to_string(),
                    elements: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn scale_steps_down_with_deck_area() {
        // 4 portrait slides: 4 * 1080 * 1350 = 5.8M pixels.
        assert!((pick_scale(&deck_with_slides(4, SlideFormatPreset::LinkedinPortrait)) - 2.0).abs() < f32::EPSILON);
        // 8 portrait slides: 11.7M.
        assert!((pick_scale(&deck_with_slides(8, SlideFormatPreset::LinkedinPortrait)) - 1.5).abs() < f32::EPSILON);
        // 10 portrait slides: 14.6M.
        assert!((pick_scale(&deck_with_slides(10, SlideFormatPreset::LinkedinPortrait)) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn filename_strips_unsafe_characters() {
        assert_eq!(pdf_filename("My Deck: 2026!"), "My Deck 2026.pdf");
        assert_eq!(pdf_filename("snake_case-title"), "snake_case-title.pdf");
        assert_eq!(pdf_filename("///"), "carousel.pdf");
        assert_eq!(pdf_filename(""), "carousel.pdf");
    }

    #[test]
    fn filename_truncates_long_titles() {
        let long = "a".repeat(200);
        let name = pdf_filename(&long);
        assert_eq!(name.len(), 64); // 60 chars + ".pdf"
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn jpeg_encode_flattens_alpha() {
        let mut pixmap = Pixmap::new(4, 4).expect("pixmap");
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 50, 255));
        let jpeg = encode_jpeg(&pixmap, 92).expect("encode");
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));

        let decoded = image::load_from_memory(&jpeg).expect("decode").to_rgb8();
        let px = decoded.get_pixel(0, 0);
        // JPEG is lossy; stay within a loose tolerance.
        assert!(px[0].abs_diff(200) < 16 && px[1].abs_diff(100) < 16);

        // Transparent pixels flatten to white.
        let empty = Pixmap::new(4, 4).expect("pixmap");
        let jpeg = encode_jpeg(&empty, 92).expect("encode");
        let decoded = image::load_from_memory(&jpeg).expect("decode").to_rgb8();
        let px = decoded.get_pixel(0, 0);
        assert!(px[0] > 240 && px[1] > 240 && px[2] > 240);
    }

    #[test]
    fn exports_full_deck() {
        let Ok(renderer) = SlideRenderer::new() else {
            eprintln!("no system fonts available, skipping");
            return;
        };
        let deck = carousel_core::editor::default_editor_deck();
        let bytes = export_deck_to_pdf(
            &renderer,
            &deck,
            &Branding::default(),
            &ExportOptions::default(),
        )
        .expect("export");
        assert!(bytes.starts_with(b"%PDF-1.4"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 4"));
        assert!(text.contains("/MediaBox [0 0 1080 1350]"));
    }

    #[test]
    fn explicit_scale_override_wins() {
        let Ok(renderer) = SlideRenderer::new() else {
            eprintln!("no system fonts available, skipping");
            return;
        };
        let deck = deck_with_slides(1, SlideFormatPreset::LinkedinSquare);
        let options = ExportOptions {
            quality_scale: Some(1.0),
            jpeg_quality: 80,
        };
        let bytes = export_deck_to_pdf(&renderer, &deck, &Branding::default(), &options)
            .expect("export");
        let text = String::from_utf8_lossy(&bytes);
        // Raster matches the slide size exactly at scale 1.
        assert!(text.contains("/Width 1080 /Height 1080"));
    }
}
