//! Versioned project documents for save/load round trips.
//!
//! A project wraps an [`EditorDeck`] and [`Branding`] in a versioned
//! envelope. Import also accepts the legacy bare-deck JSON the app emitted
//! before the envelope existed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::deck::{validate_deck, Deck};
use crate::editor::{Branding, EditorDeck, SlideElement};

/// Envelope type tag.
pub const PROJECT_TYPE: &str = "sooft_carousel";
/// Current envelope version.
pub const PROJECT_VERSION: u32 = 1;

/// A saved project: branding plus the full editor deck.
///
/// The avatar image is stripped on export to keep documents small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselProjectV1 {
    /// Envelope tag; always [`PROJECT_TYPE`].
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Envelope version; always [`PROJECT_VERSION`].
    pub version: u32,
    /// RFC 3339 save timestamp.
    pub saved_at: String,
    /// Branding without the avatar image.
    pub branding: Branding,
    /// The full editor deck.
    pub deck: EditorDeck,
}

/// Which shape an imported document matched.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedImport {
    /// A versioned project; usable directly.
    Project(CarouselProjectV1),
    /// A legacy bare deck; must be re-expanded through
    /// [`crate::editor::api_deck_to_editor`] before use.
    Legacy(Deck),
}

/// Wrap a deck and branding in a fresh versioned envelope.
#[must_use]
pub fn serialize_project(deck: &EditorDeck, branding: &Branding) -> CarouselProjectV1 {
    serialize_project_at(deck, branding, Utc::now())
}

/// [`serialize_project`] with an explicit timestamp.
#[must_use]
pub fn serialize_project_at(
    deck: &EditorDeck,
    branding: &Branding,
    saved_at: DateTime<Utc>,
) -> CarouselProjectV1 {
    let branding = Branding {
        avatar_src: None,
        ..branding.clone()
    };
    CarouselProjectV1 {
        doc_type: PROJECT_TYPE.to_string(),
        version: PROJECT_VERSION,
        saved_at: saved_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        branding,
        deck: deck.clone(),
    }
}

fn editor_deck_is_wellformed(deck: &EditorDeck) -> bool {
    !deck.slides.is_empty()
        && deck.slides.iter().all(|slide| {
            !slide.id.is_empty()
                && slide.elements.iter().all(|el| match el {
                    SlideElement::Text(text) => !text.id.is_empty(),
                    SlideElement::Image(image) => !image.id.is_empty() && !image.src.is_empty(),
                })
        })
}

/// Parse an imported JSON document as a project, falling back to the legacy
/// bare-deck shape. Returns `None` when neither validates.
#[must_use]
pub fn parse_project_or_legacy(input: &serde_json::Value) -> Option<ParsedImport> {
    if let Ok(project) = serde_json::from_value::<CarouselProjectV1>(input.clone()) {
        if project.doc_type == PROJECT_TYPE
            && project.version == PROJECT_VERSION
            && editor_deck_is_wellformed(&project.deck)
        {
            return Some(ParsedImport::Project(project));
        }
    }
    if let Ok(deck) = serde_json::from_value::<Deck>(input.clone()) {
        if validate_deck(&deck).is_ok() {
            return Some(ParsedImport::Legacy(deck));
        }
    }
    None
}
