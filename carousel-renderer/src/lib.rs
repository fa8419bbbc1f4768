//! # Carousel Renderer
//!
//! CPU rasterizer and PDF assembler for Carousel Studio slides.
//!
//! ## Pipeline
//!
//! ```text
//! EditorDeck ──► canvas (tiny-skia raster per slide, supersampled)
//!                  │
//!                  ▼
//!               export (alpha flatten + JPEG encode)
//!                  │
//!                  ▼
//!               pdf (hand-built object graph, DCTDecode streams)
//! ```
//!
//! Text is measured and rasterized with `ab_glyph` over system fonts found
//! through `fontdb`; no GPU, no browser, no external PDF library.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod color;
pub mod error;
pub mod export;
pub mod image;
pub mod pdf;
pub mod text;

pub use canvas::SlideRenderer;
pub use error::{RenderError, RenderResult};
pub use export::{export_deck_to_pdf, pdf_filename, pick_scale, ExportOptions};
pub use pdf::{build_pdf, PdfPage};
pub use text::FontStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
