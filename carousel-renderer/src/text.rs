//! Font lookup, text measurement, word wrapping, and glyph rasterization.
//!
//! Wrapping is decoupled from real fonts through the [`TextMeasure`] trait so
//! layout properties can be tested without a font installed.

use std::collections::BTreeMap;

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use tiny_skia::{Color, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Font weights the renderer distinguishes. Matches the editor model's
/// 400/600/700 plus the 500 used by the branding footer.
pub const FONT_WEIGHTS: [u16; 4] = [400, 500, 600, 700];

/// Measures rendered text width at a given size and weight.
pub trait TextMeasure {
    /// Width in pixels of `text` drawn on a single line.
    fn text_width(&self, text: &str, font_size: f32, weight: u16) -> f32;
}

/// Sans-serif faces resolved per weight.
///
/// Faces are looked up once at construction; rendering never touches the
/// font database again.
pub struct FontStore {
    faces: BTreeMap<u16, FontArc>,
}

impl FontStore {
    /// Discover system sans-serif faces for every weight in [`FONT_WEIGHTS`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] when no sans-serif face is installed.
    pub fn load_system() -> RenderResult<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut faces = BTreeMap::new();
        for weight in FONT_WEIGHTS {
            let query = fontdb::Query {
                families: &[fontdb::Family::SansSerif],
                weight: fontdb::Weight(weight),
                ..fontdb::Query::default()
            };
            let Some(id) = db.query(&query) else {
                continue;
            };
            let face = db
                .with_face_data(id, |data, index| {
                    ab_glyph::FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
                })
                .flatten();
            if let Some(face) = face {
                faces.insert(weight, FontArc::new(face));
            }
        }

        if faces.is_empty() {
            return Err(RenderError::Font(
                "no system sans-serif font found".to_string(),
            ));
        }
        tracing::debug!(weights = faces.len(), "loaded system font faces");
        Ok(Self { faces })
    }

    /// Build a store from a single font's bytes, used for every weight.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if the bytes are not a parseable font.
    pub fn from_bytes(bytes: Vec<u8>) -> RenderResult<Self> {
        let face = FontArc::try_from_vec(bytes)
            .map_err(|e| RenderError::Font(format!("invalid font data: {e}")))?;
        let mut faces = BTreeMap::new();
        faces.insert(400, face);
        Ok(Self { faces })
    }

    /// The face closest to the requested weight.
    ///
    /// # Panics
    ///
    /// Never panics in practice; both constructors guarantee at least one
    /// face.
    #[must_use]
    pub fn face(&self, weight: u16) -> &FontArc {
        self.faces
            .iter()
            .min_by_key(|(w, _)| w.abs_diff(weight))
            .map(|(_, face)| face)
            .expect("FontStore is never empty")
    }
}

impl TextMeasure for FontStore {
    fn text_width(&self, text: &str, font_size: f32, weight: u16) -> f32 {
        line_width(self.face(weight), text, font_size)
    }
}

/// Advance width of one line of text, including kerning.
fn line_width(font: &FontArc, text: &str, font_size: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(font_size));
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Greedy word wrap against a box width.
///
/// Explicit newlines always start a new line; within a paragraph, words are
/// packed while the measured line fits `max_width`. A single word wider than
/// the box still gets its own (overflowing) line; clipping is the caller's
/// concern.
pub fn wrap_lines(
    measure: &dyn TextMeasure,
    text: &str,
    font_size: f32,
    weight: u16,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            lines.push(String::new());
            continue;
        };
        let mut line = first.to_string();
        for word in words {
            let candidate = format!("{line} {word}");
            if measure.text_width(&candidate, font_size, weight) <= max_width {
                line = candidate;
            } else {
                lines.push(line);
                line = word.to_string();
            }
        }
        lines.push(line);
    }
    lines
}

/// Axis-aligned clip region in device pixels.
#[derive(Debug, Clone, Copy)]
pub struct ClipBox {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl ClipBox {
    /// Clip covering the whole pixmap.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn full(pixmap: &Pixmap) -> Self {
        Self {
            left: 0,
            top: 0,
            right: pixmap.width() as i32,
            bottom: pixmap.height() as i32,
        }
    }

    /// Clip for a box in device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            left: x.floor() as i32,
            top: y.floor() as i32,
            right: (x + w).ceil() as i32,
            bottom: (y + h).ceil() as i32,
        }
    }

    fn contains(self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Blend a single coverage sample into a premultiplied pixmap, src-over.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn blend_coverage(pixmap: &mut Pixmap, x: i32, y: i32, color: Color, alpha: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let src_a = color.alpha() * alpha;
    let src_r = color.red() * src_a;
    let src_g = color.green() * src_a;
    let src_b = color.blue() * src_a;
    let inv = 1.0 - src_a;

    let idx = (y as usize * pixmap.width() as usize + x as usize) * 4;
    let data = pixmap.data_mut();
    let dst = |v: u8| f32::from(v) / 255.0;
    data[idx] = ((src_r + dst(data[idx]) * inv) * 255.0).round() as u8;
    data[idx + 1] = ((src_g + dst(data[idx + 1]) * inv) * 255.0).round() as u8;
    data[idx + 2] = ((src_b + dst(data[idx + 2]) * inv) * 255.0).round() as u8;
    data[idx + 3] = ((src_a + dst(data[idx + 3]) * inv) * 255.0).round() as u8;
}

/// Draw one line of text with its top edge at `top_y`.
///
/// Glyph coverage is blended directly into the pixmap, clipped to `clip`.
#[allow(
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
pub fn draw_line(
    pixmap: &mut Pixmap,
    font: &FontArc,
    text: &str,
    font_size: f32,
    origin_x: f32,
    top_y: f32,
    color: Color,
    opacity: f32,
    clip: ClipBox,
) {
    let scaled = font.as_scaled(PxScale::from(font_size));
    let baseline = top_y + scaled.ascent();
    let mut caret = origin_x;
    let mut prev = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(PxScale::from(font_size), point(caret, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let min_x = bounds.min.x as i32;
            let min_y = bounds.min.y as i32;
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + min_x;
                let y = py as i32 + min_y;
                if clip.contains(x, y) {
                    blend_coverage(pixmap, x, y, color, coverage * opacity);
                }
            });
        }
        caret += scaled.h_advance(id);
        prev = Some(id);
    }
}
