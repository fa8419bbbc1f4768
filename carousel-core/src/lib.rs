//! # Carousel Core
//!
//! Schema and data model for Carousel Studio: the generated deck contract,
//! the positional editor model, and the versioned project document.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                carousel-core                  │
//! ├───────────────────────────────────────────────┤
//! │  deck            │  editor                    │
//! │  - wire schema   │  - positioned elements     │
//! │  - validation    │  - deck expansion          │
//! │  - count repair  │  - reorder / ids           │
//! ├───────────────────────────────────────────────┤
//! │  project: versioned envelope + legacy import  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure data transformation; no I/O, no async.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod deck;
pub mod editor;
pub mod project;

pub use deck::{
    validate_deck, validate_request, Deck, GenerateRequest, Issue, IssueCode, Slide,
    ValidationError,
};
pub use editor::{
    api_deck_to_editor, api_slide_to_editor, create_id, default_editor_deck, format_from_preset,
    reorder, Branding, EditorDeck, EditorSlide, FontWeight, ImageElement, SlideElement,
    SlideFormat, SlideFormatPreset, TextAlign, TextElement, TextKind,
};
pub use project::{
    parse_project_or_legacy, serialize_project, serialize_project_at, CarouselProjectV1,
    ParsedImport,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
