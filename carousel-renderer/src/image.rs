//! Image loading from data URIs.
//!
//! Slide images and avatars are embedded as self-contained data URIs; this
//! module decodes them into premultiplied pixmaps ready for compositing.

use base64::Engine;
use tiny_skia::{IntSize, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Decode a data URI (`data:image/png;base64,...`) into a premultiplied
/// RGBA pixmap.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed or the image
/// cannot be decoded.
pub fn decode_data_uri(uri: &str) -> RenderResult<Pixmap> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("not a data URI".to_string()))?;

    let comma = rest
        .find(',')
        .ok_or_else(|| RenderError::Resource("invalid data URI: missing comma".to_string()))?;
    let (metadata, payload) = rest.split_at(comma);
    let payload = &payload[1..];

    let bytes = if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| RenderError::Resource(format!("invalid base64 payload: {e}")))?
    } else {
        percent_decode(payload)?
    };

    decode_bytes(&bytes)
}

/// Decode raw image bytes into a premultiplied RGBA pixmap.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the bytes are not a decodable image.
#[allow(clippy::cast_possible_truncation)]
pub fn decode_bytes(bytes: &[u8]) -> RenderResult<Pixmap> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RenderError::Resource(format!("failed to decode image: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    // tiny-skia pixmaps are premultiplied.
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        px[0] = ((u16::from(px[0]) * a) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a) / 255) as u8;
    }

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| RenderError::Resource("zero-sized image".to_string()))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| RenderError::Resource("image buffer mismatch".to_string()))
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next();
            let lo = bytes.next();
            let decoded = match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    let hex = [hi, lo];
                    std::str::from_utf8(&hex)
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok())
                }
                _ => None,
            };
            match decoded {
                Some(byte) => out.push(byte),
                None => {
                    return Err(RenderError::Resource("invalid URL encoding".to_string()));
                }
            }
        } else {
            out.push(b);
        }
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a tiny solid-color PNG as a data URI.
    pub(crate) fn png_data_uri(width: u32, height: u32, rgba: [u8; 4]) -> String {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png)
            .expect("png encode");
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
        )
    }

    #[test]
    fn decodes_round_tripped_png() {
        let uri = png_data_uri(3, 2, [255, 0, 0, 255]);
        let pixmap = decode_data_uri(&uri).expect("decode");
        assert_eq!((pixmap.width(), pixmap.height()), (3, 2));
        let px = pixmap.pixel(0, 0).expect("pixel");
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 0, 0, 255));
    }

    #[test]
    fn premultiplies_transparent_pixels() {
        let uri = png_data_uri(1, 1, [255, 255, 255, 0]);
        let pixmap = decode_data_uri(&uri).expect("decode");
        let px = pixmap.pixel(0, 0).expect("pixel");
        assert_eq!((px.red(), px.alpha()), (0, 0));
    }

    #[test]
    fn rejects_malformed_uris() {
        assert!(decode_data_uri("not a data uri").is_err());
        assert!(decode_data_uri("data:image/png").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }
}
