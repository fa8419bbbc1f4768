//! Slide rasterization.
//!
//! Draws one editor slide into a [`Pixmap`] at an arbitrary supersampling
//! scale: background fill, elements in z-order, then the branding footer
//! (avatar, name, handle, and the forward arrow or the thumbs-up on the last
//! slide). All layout math happens in device pixels; paths are pre-transformed
//! and painted with `Transform::identity`.

use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, Paint, Path, PathBuilder, Pattern, Pixmap,
    SpreadMode, Stroke, Transform,
};

use carousel_core::editor::{
    Branding, EditorSlide, ImageElement, SlideElement, TextAlign, TextElement,
};

use crate::color::color_or_black;
use crate::error::{RenderError, RenderResult};
use crate::image::decode_data_uri;
use crate::text::{draw_line, wrap_lines, ClipBox, FontStore, TextMeasure};

const FOOTER_PAD_X: f32 = 90.0;
const FOOTER_PAD_BOTTOM: f32 = 70.0;
const AVATAR_SIZE: f32 = 96.0;
const AVATAR_GAP: f32 = 26.0;
const INDICATOR_SIZE: f32 = 68.0;

/// Renders editor slides into pixmaps using a fixed font set.
pub struct SlideRenderer {
    fonts: FontStore,
}

impl SlideRenderer {
    /// Build a renderer backed by system sans-serif fonts.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] when no usable face is installed.
    pub fn new() -> RenderResult<Self> {
        Ok(Self {
            fonts: FontStore::load_system()?,
        })
    }

    /// Build a renderer with explicit fonts, mainly for tests.
    #[must_use]
    pub fn with_fonts(fonts: FontStore) -> Self {
        Self { fonts }
    }

    /// Raster one slide at `scale` device pixels per slide unit.
    ///
    /// `is_last` switches the footer indicator from the forward arrow to the
    /// thumbs-up.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Canvas`] if the surface cannot be allocated and
    /// [`RenderError::Resource`] if an embedded image fails to decode.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_slide(
        &self,
        slide: &EditorSlide,
        branding: &Branding,
        scale: f32,
        is_last: bool,
    ) -> RenderResult<Pixmap> {
        let width = (slide.format.width * scale).round() as u32;
        let height = (slide.format.height * scale).round() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Canvas(format!("cannot allocate {width}x{height} surface"))
        })?;

        pixmap.fill(color_or_black(&slide.background_color));

        for element in &slide.elements {
            match element {
                SlideElement::Text(el) => self.draw_text_element(&mut pixmap, el, scale),
                SlideElement::Image(el) => draw_image_element(&mut pixmap, el, scale)?,
            }
        }

        self.draw_footer(&mut pixmap, slide, branding, scale, is_last);
        Ok(pixmap)
    }

    fn draw_text_element(&self, pixmap: &mut Pixmap, el: &TextElement, scale: f32) {
        let color = color_or_black(&el.color);
        let weight = u16::from(el.font_weight);
        let font_size = el.font_size * scale;
        let max_width = el.w * scale;
        // Line advance rounds in slide units so supersampled and preview
        // renders agree on layout.
        let advance = (el.font_size * el.line_height).round() * scale;

        let lines = wrap_lines(&self.fonts, &el.text, font_size, weight, max_width);
        let clip = ClipBox::from_rect(el.x * scale, el.y * scale, max_width, el.h * scale);
        let font = self.fonts.face(weight);

        for (i, line) in lines.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let top_y = el.y * scale + i as f32 * advance;
            // Lines past the bottom of the box are dropped, not clipped. The
            // bound uses the rounded line advance, not the font size.
            if top_y + advance > (el.y + el.h) * scale {
                break;
            }
            let origin_x = match el.align {
                TextAlign::Left => el.x * scale,
                TextAlign::Center => {
                    let line_width = self.fonts.text_width(line, font_size, weight);
                    el.x * scale + (max_width - line_width) / 2.0
                }
            };
            draw_line(
                pixmap, font, line, font_size, origin_x, top_y, color, el.opacity, clip,
            );
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_footer(
        &self,
        pixmap: &mut Pixmap,
        slide: &EditorSlide,
        branding: &Branding,
        scale: f32,
        is_last: bool,
    ) {
        let width = slide.format.width;
        let base_y = slide.format.height - FOOTER_PAD_BOTTOM - AVATAR_SIZE;

        let avatar = circle_path(
            (FOOTER_PAD_X + AVATAR_SIZE / 2.0) * scale,
            (base_y + AVATAR_SIZE / 2.0) * scale,
            AVATAR_SIZE / 2.0 * scale,
        );
        if let Some(avatar) = avatar {
            // Avatar decode failures degrade to the placeholder circle; a
            // broken avatar must not block an export.
            let photo = branding
                .avatar_src
                .as_deref()
                .and_then(|src| match decode_data_uri(src) {
                    Ok(photo) => Some(photo),
                    Err(err) => {
                        tracing::warn!(%err, "ignoring undecodable avatar");
                        None
                    }
                });
            match photo {
                Some(photo) => fill_with_cover_image(
                    pixmap,
                    &avatar,
                    &photo,
                    FOOTER_PAD_X * scale,
                    base_y * scale,
                    AVATAR_SIZE * scale,
                    AVATAR_SIZE * scale,
                    1.0,
                ),
                None => {
                    let mut paint = Paint::default();
                    paint.set_color(Color::from_rgba8(255, 255, 255, 15));
                    paint.anti_alias = true;
                    pixmap.fill_path(
                        &avatar,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
        }

        let clip = ClipBox::full(pixmap);
        let text_x = (FOOTER_PAD_X + AVATAR_SIZE + AVATAR_GAP) * scale;
        draw_line(
            pixmap,
            self.fonts.face(500),
            &branding.name,
            42.0 * scale,
            text_x,
            (base_y + 8.0) * scale,
            color_or_black(&branding.name_color),
            1.0,
            clip,
        );
        draw_line(
            pixmap,
            self.fonts.face(400),
            &branding.handle,
            30.0 * scale,
            text_x,
            (base_y + 56.0) * scale,
            color_or_black(&branding.handle_color),
            0.9,
            clip,
        );

        let indicator_x = width - FOOTER_PAD_X - INDICATOR_SIZE;
        let indicator_y = base_y + 28.0;
        let color = color_or_black(&branding.arrow_color);
        if is_last {
            draw_thumbs_up(pixmap, indicator_x, indicator_y, INDICATOR_SIZE, scale, color);
        } else {
            draw_arrow(pixmap, indicator_x, indicator_y, INDICATOR_SIZE, scale, color);
        }
    }
}

/// Scale factor and centering offsets for cover-fitting an image into a box.
///
/// The image is scaled uniformly until it covers the box; the overflow is
/// split evenly on both sides.
#[must_use]
pub fn cover_transform(box_w: f32, box_h: f32, img_w: f32, img_h: f32) -> (f32, f32, f32) {
    let scale = (box_w / img_w).max(box_h / img_h);
    let dx = (box_w - img_w * scale) / 2.0;
    let dy = (box_h - img_h * scale) / 2.0;
    (scale, dx, dy)
}

/// Rounded-rectangle path with radius clamped to half the shorter side.
#[must_use]
pub fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    let max_r = (w / 2.0).min(h / 2.0);
    let r = if max_r > 0.0 { r.min(max_r) } else { 0.0 };
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

fn circle_path(cx: f32, cy: f32, r: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.push_circle(cx, cy, r);
    pb.finish()
}

/// Paint `image` cover-fitted into the box behind `path`.
#[allow(clippy::too_many_arguments, clippy::cast_precision_loss)]
fn fill_with_cover_image(
    pixmap: &mut Pixmap,
    path: &Path,
    image: &Pixmap,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    opacity: f32,
) {
    let (scale, dx, dy) = cover_transform(w, h, image.width() as f32, image.height() as f32);
    let pattern = Pattern::new(
        image.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bilinear,
        opacity,
        Transform::from_row(scale, 0.0, 0.0, scale, x + dx, y + dy),
    );
    let paint = Paint {
        shader: pattern,
        anti_alias: true,
        ..Paint::default()
    };
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn draw_image_element(pixmap: &mut Pixmap, el: &ImageElement, scale: f32) -> RenderResult<()> {
    let image = decode_data_uri(&el.src)?;
    let (x, y, w, h) = (el.x * scale, el.y * scale, el.w * scale, el.h * scale);
    let Some(path) = rounded_rect_path(x, y, w, h, 16.0 * scale) else {
        return Ok(());
    };
    fill_with_cover_image(pixmap, &path, &image, x, y, w, h, el.opacity);
    Ok(())
}

/// Forward arrow: a shaft plus two head strokes, round caps.
fn draw_arrow(pixmap: &mut Pixmap, x: f32, y: f32, size: f32, scale: f32, color: Color) {
    let mid = y + size / 2.0;
    let mut pb = PathBuilder::new();
    pb.move_to(x * scale, mid * scale);
    pb.line_to((x + size) * scale, mid * scale);
    pb.move_to((x + size * 0.6) * scale, (y + size * 0.2) * scale);
    pb.line_to((x + size) * scale, mid * scale);
    pb.move_to((x + size * 0.6) * scale, (y + size * 0.8) * scale);
    pb.line_to((x + size) * scale, mid * scale);
    let Some(path) = pb.finish() else { return };

    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: 6.0 * scale,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Thumbs-up glyph built in a 24-unit box, filled and outlined.
fn draw_thumbs_up(pixmap: &mut Pixmap, x: f32, y: f32, size: f32, scale: f32, color: Color) {
    let mut pb = PathBuilder::new();
    // Body of the hand, arcs approximated with quads.
    pb.move_to(15.0, 5.88);
    pb.line_to(14.0, 10.0);
    pb.line_to(19.83, 10.0);
    pb.quad_to(22.1, 10.0, 21.75, 12.56);
    pb.line_to(19.42, 20.56);
    pb.quad_to(19.0, 22.0, 17.5, 22.0);
    pb.line_to(4.0, 22.0);
    pb.quad_to(2.0, 22.0, 2.0, 20.0);
    pb.line_to(2.0, 12.0);
    pb.quad_to(2.0, 10.0, 4.0, 10.0);
    pb.line_to(6.76, 10.0);
    pb.quad_to(8.1, 10.0, 8.55, 8.89);
    pb.line_to(12.0, 2.0);
    pb.cubic_to(13.73, 2.0, 15.4, 3.55, 15.0, 5.88);
    pb.close();
    // Palm divider.
    pb.move_to(7.0, 10.0);
    pb.line_to(7.0, 22.0);
    let Some(path) = pb.finish() else { return };

    let s = size / 24.0 * scale;
    let Some(path) = path.transform(Transform::from_row(s, 0.0, 0.0, s, x * scale, y * scale))
    else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    let stroke = Stroke {
        width: 2.0 * s,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}
