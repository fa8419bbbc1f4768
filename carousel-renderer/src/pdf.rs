//! Minimal PDF writer.
//!
//! Builds a multi-page document by hand: one JPEG image XObject per page,
//! painted edge to edge by a four-line content stream. Objects are written
//! sequentially with byte offsets recorded for the cross-reference table, so
//! the output needs no external PDF library and no compression pass.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One finished page: a JPEG raster plus its point-space dimensions.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page width in PDF points.
    pub width: f32,
    /// Page height in PDF points.
    pub height: f32,
    /// Raster width in pixels.
    pub px_width: u32,
    /// Raster height in pixels.
    pub px_height: u32,
    /// JPEG-encoded page raster.
    pub jpeg: Vec<u8>,
}

/// Number of indirect objects a document with `pages` pages contains.
///
/// Catalog and page tree, then page + contents + image per page.
#[must_use]
pub fn object_count(pages: usize) -> usize {
    2 + pages * 3
}

#[allow(clippy::cast_possible_truncation)]
fn fmt_num(value: f32) -> String {
    if (value - value.round()).abs() < f32::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.2}")
    }
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: BTreeMap<usize, usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        // Binary marker comment so transports treat the file as binary.
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: BTreeMap::new(),
        }
    }

    fn begin_object(&mut self, id: usize) {
        self.offsets.insert(id, self.buf.len());
        let _ = write!(self.buf_str(), "{id} 0 obj\n");
    }

    fn buf_str(&mut self) -> StringSink<'_> {
        StringSink(&mut self.buf)
    }

    fn dict_object(&mut self, id: usize, body: &str) {
        self.begin_object(id);
        let _ = write!(self.buf_str(), "{body}\nendobj\n");
    }

    fn stream_object(&mut self, id: usize, dict: &str, data: &[u8]) {
        self.begin_object(id);
        let _ = write!(self.buf_str(), "{dict}\nstream\n");
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root_id: usize) -> Vec<u8> {
        let object_count = self.offsets.len();
        let xref_offset = self.buf.len();
        let _ = write!(self.buf_str(), "xref\n0 {}\n", object_count + 1);
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for id in 1..=object_count {
            let offset = self.offsets.get(&id).copied().unwrap_or(0);
            let _ = write!(self.buf_str(), "{offset:010} 00000 n \n");
        }
        let _ = write!(
            self.buf_str(),
            "trailer\n<< /Size {} /Root {root_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            object_count + 1
        );
        self.buf
    }
}

/// `std::fmt::Write` adapter over the byte buffer; PDF structure is ASCII.
struct StringSink<'a>(&'a mut Vec<u8>);

impl std::fmt::Write for StringSink<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Assemble the final document from finished pages.
///
/// Layout: catalog (object 1), page tree (object 2), then for each page an
/// image XObject, a content stream, and the page dictionary.
#[must_use]
pub fn build_pdf(pages: &[PdfPage]) -> Vec<u8> {
    let mut writer = PdfWriter::new();

    let page_id = |idx: usize| 3 + idx * 3;
    let contents_id = |idx: usize| page_id(idx) + 1;
    let image_id = |idx: usize| page_id(idx) + 2;

    writer.dict_object(1, "<< /Type /Catalog /Pages 2 0 R >>");

    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_id(i))).collect();
    writer.dict_object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );

    for (idx, page) in pages.iter().enumerate() {
        let (w, h) = (fmt_num(page.width), fmt_num(page.height));

        writer.stream_object(
            image_id(idx),
            &format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode \
                 /Length {} >>",
                page.px_width,
                page.px_height,
                page.jpeg.len()
            ),
            &page.jpeg,
        );

        let content = format!("q\n{w} 0 0 {h} 0 0 cm\n/Im{idx} Do\nQ\n");
        writer.stream_object(
            contents_id(idx),
            &format!("<< /Length {} >>", content.len()),
            content.as_bytes(),
        );

        writer.dict_object(
            page_id(idx),
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] \
                 /Resources << /ProcSet [/PDF /ImageC] \
                 /XObject << /Im{idx} {} 0 R >> >> \
                 /Contents {} 0 R >>",
                image_id(idx),
                contents_id(idx)
            ),
        );
    }

    writer.finish(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 90)
            .encode_image(&img)
            .expect("jpeg encode");
        out.into_inner()
    }

    fn page(width: f32, height: f32) -> PdfPage {
        PdfPage {
            width,
            height,
            px_width: 8,
            px_height: 10,
            jpeg: tiny_jpeg(8, 10),
        }
    }

    #[test]
    fn header_and_trailer_are_well_formed() {
        let bytes = build_pdf(&[page(1080.0, 1350.0)]);
        assert!(bytes.starts_with(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn object_count_matches_layout() {
        assert_eq!(object_count(0), 2);
        assert_eq!(object_count(3), 11);

        let bytes = build_pdf(&[page(100.0, 100.0), page(100.0, 100.0)]);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains(&format!("/Size {}", object_count(2) + 1)));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Kids [3 0 R 6 0 R]"));
    }

    #[test]
    fn media_box_uses_point_dimensions() {
        let bytes = build_pdf(&[page(1080.0, 1350.0)]);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox [0 0 1080 1350]"));
        assert!(text.contains("/ProcSet [/PDF /ImageC]"));
        assert!(text.contains("1080 0 0 1350 0 0 cm"));
        assert!(text.contains("/Im0 Do"));
    }

    #[test]
    fn image_object_carries_jpeg_metadata() {
        let jpeg = tiny_jpeg(8, 10);
        let len = jpeg.len();
        let bytes = build_pdf(&[PdfPage {
            width: 80.0,
            height: 100.0,
            px_width: 8,
            px_height: 10,
            jpeg,
        }]);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Width 8 /Height 10"));
        assert!(text.contains(&format!("/Length {len} >>")));
    }

    #[test]
    fn xref_offsets_point_at_object_headers() {
        let bytes = build_pdf(&[page(100.0, 200.0), page(100.0, 200.0)]);
        let text = String::from_utf8_lossy(&bytes);

        // "startxref\n" also ends in "xref\n"; anchor on the preceding newline.
        let xref_at = text.rfind("\nxref\n").expect("xref section") + 1;
        let lines: Vec<&str> = text[xref_at..].lines().collect();
        assert_eq!(lines[1], format!("0 {}", object_count(2) + 1));
        assert_eq!(lines[2], "0000000000 65535 f ");

        for (id, line) in lines[3..3 + object_count(2)].iter().enumerate() {
            let offset: usize = line[..10].parse().expect("offset");
            let header = format!("{} 0 obj", id + 1);
            assert!(
                bytes[offset..].starts_with(header.as_bytes()),
                "object {} offset {} does not start an object",
                id + 1,
                offset
            );
        }

        let startxref: usize = lines[lines.len() - 2].parse().expect("startxref");
        assert!(bytes[startxref..].starts_with(b"xref\n"));
    }

}
