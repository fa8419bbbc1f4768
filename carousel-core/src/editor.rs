//! Editor data model: slides as fixed-size canvases with positioned elements.
//!
//! A generated [`Deck`] carries content only; this module expands it into the
//! positional representation the editor and renderer share. All geometry is
//! in slide-format pixel space (e.g. 1080x1350).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deck::{Deck, Slide};

/// LinkedIn portrait format, 4:5.
pub const LINKEDIN_PORTRAIT: (f32, f32) = (1080.0, 1350.0);
/// LinkedIn square format.
pub const LINKEDIN_SQUARE: (f32, f32) = (1080.0, 1080.0);

/// Named slide format presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideFormatPreset {
    /// 1080x1350 portrait.
    LinkedinPortrait,
    /// 1080x1080 square.
    LinkedinSquare,
    /// Explicit width/height chosen by the user.
    Custom,
}

/// A slide's canvas dimensions plus the preset they came from.
///
/// `width`/`height` are authoritative; the preset is kept so the editor can
/// show which choice produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideFormat {
    /// Preset this format was derived from.
    pub preset: SlideFormatPreset,
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
}

/// Map a preset to concrete dimensions. `Custom` starts out portrait-sized
/// until the user resizes it.
#[must_use]
pub fn format_from_preset(preset: SlideFormatPreset) -> SlideFormat {
    let (width, height) = match preset {
        SlideFormatPreset::LinkedinSquare => LINKEDIN_SQUARE,
        SlideFormatPreset::LinkedinPortrait | SlideFormatPreset::Custom => LINKEDIN_PORTRAIT,
    };
    SlideFormat {
        preset,
        width,
        height,
    }
}

/// Semantic role of a text element. Affects default styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// Slide headline.
    Title,
    /// Secondary headline.
    Subtitle,
    /// Body copy.
    Body,
}

/// Horizontal text alignment within the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush against the box's left edge.
    Left,
    /// Centered on the box's horizontal midpoint.
    Center,
}

/// Allowed font weights, serialized as their numeric CSS values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum FontWeight {
    /// 400.
    Regular,
    /// 600.
    Semibold,
    /// 700.
    Bold,
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        match weight {
            FontWeight::Regular => 400,
            FontWeight::Semibold => 600,
            FontWeight::Bold => 700,
        }
    }
}

impl TryFrom<u16> for FontWeight {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            400 => Ok(Self::Regular),
            600 => Ok(Self::Semibold),
            700 => Ok(Self::Bold),
            other => Err(format!("unsupported font weight: {other}")),
        }
    }
}

/// A positioned, styled text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Unique element id.
    pub id: String,
    /// Semantic role.
    pub kind: TextKind,
    /// Literal text; may contain explicit line breaks.
    pub text: String,
    /// Box left edge.
    pub x: f32,
    /// Box top edge.
    pub y: f32,
    /// Box width.
    pub w: f32,
    /// Box height.
    pub h: f32,
    /// Fill color as a hex string.
    pub color: String,
    /// Font size in slide pixels.
    pub font_size: f32,
    /// Line height multiplier.
    pub line_height: f32,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Uniform opacity in [0, 1].
    pub opacity: f32,
}

/// A positioned image, embedded as a self-contained data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    /// Unique element id.
    pub id: String,
    /// Image bytes as a data URI.
    pub src: String,
    /// Box left edge.
    pub x: f32,
    /// Box top edge.
    pub y: f32,
    /// Box width.
    pub w: f32,
    /// Box height.
    pub h: f32,
    /// Uniform opacity in [0, 1].
    pub opacity: f32,
}

/// One positioned element on a slide canvas.
///
/// Consumers must branch exhaustively on the variant; there is no capability
/// probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlideElement {
    /// Text block.
    Text(TextElement),
    /// Image box.
    Image(ImageElement),
}

impl SlideElement {
    /// The element's unique id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Text(el) => &el.id,
            Self::Image(el) => &el.id,
        }
    }
}

/// An editable slide: a canvas with a background and ordered elements.
///
/// Element order is z-order; later elements draw on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSlide {
    /// Unique slide id.
    pub id: String,
    /// Canvas format.
    pub format: SlideFormat,
    /// Background fill as a hex string.
    pub background_color: String,
    /// Elements in z-order.
    pub elements: Vec<SlideElement>,
}

/// The editable deck: title plus slides in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorDeck {
    /// Deck title.
    pub title: String,
    /// Slides in presentation order.
    pub slides: Vec<EditorSlide>,
}

/// The fixed identity overlay rendered on every slide's footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    /// Avatar image as a data URI; a placeholder circle is drawn when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_src: Option<String>,
    /// Display name.
    pub name: String,
    /// Handle line under the name.
    pub handle: String,
    /// Name text color.
    pub name_color: String,
    /// Handle text color.
    pub handle_color: String,
    /// Color of the forward arrow / thumbs-up indicator.
    pub arrow_color: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            avatar_src: None,
            name: "Your Name".to_string(),
            handle: "yourhandle".to_string(),
            name_color: "#c7c7d7".to_string(),
            handle_color: "#9aa0b4".to_string(),
            arrow_color: "#7c7cff".to_string(),
        }
    }
}

/// Generate an identifier unique within the running session.
///
/// No global registry; v4 collision probability is accepted as negligible.
#[must_use]
pub fn create_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

/// Move one item to a new index, preserving the relative order of the rest.
///
/// Pure: returns a new vector. Out-of-range `from` returns the input
/// unchanged; `to` is clamped.
#[must_use]
pub fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut next = items.to_vec();
    if from >= next.len() {
        return next;
    }
    let item = next.remove(from);
    let to = to.min(next.len());
    next.insert(to, item);
    next
}

struct TextDefaults {
    font_size: f32,
    line_height: f32,
    font_weight: FontWeight,
    color: &'static str,
    w: f32,
    h: f32,
}

fn default_text_styles(kind: TextKind) -> TextDefaults {
    match kind {
        TextKind::Title => TextDefaults {
            font_size: 112.0,
            line_height: 1.05,
            font_weight: FontWeight::Bold,
            color: "#7c7cff",
            w: 900.0,
            h: 420.0,
        },
        TextKind::Subtitle => TextDefaults {
            font_size: 54.0,
            line_height: 1.2,
            font_weight: FontWeight::Semibold,
            color: "#7c7cff",
            w: 900.0,
            h: 160.0,
        },
        TextKind::Body => TextDefaults {
            font_size: 46.0,
            line_height: 1.35,
            font_weight: FontWeight::Regular,
            color: "#c7c7d7",
            w: 900.0,
            h: 620.0,
        },
    }
}

fn text_element(kind: TextKind, text: &str, x: f32, y: f32, opacity: f32) -> SlideElement {
    let defaults = default_text_styles(kind);
    SlideElement::Text(TextElement {
        id: create_id("el"),
        kind,
        text: text.to_string(),
        x,
        y,
        w: defaults.w,
        h: defaults.h,
        color: defaults.color.to_string(),
        font_size: defaults.font_size,
        line_height: defaults.line_height,
        font_weight: defaults.font_weight,
        align: TextAlign::Left,
        opacity,
    })
}

/// Expand one generated slide into a positioned editor slide.
///
/// The title element is always present; subtitle and body are added only when
/// the generated slide carries them. The body's vertical offset depends on
/// whether a subtitle exists so the two never overlap.
#[must_use]
pub fn api_slide_to_editor(slide: &Slide, idx: usize) -> EditorSlide {
    let title = if slide.title.is_empty() {
        format!("Slide {}", idx + 1)
    } else {
        slide.title.clone()
    };

    let mut elements = vec![text_element(TextKind::Title, &title, 90.0, 160.0, 1.0)];

    if let Some(subtitle) = slide.subtitle.as_deref().filter(|s| !s.is_empty()) {
        elements.push(text_element(TextKind::Subtitle, subtitle, 90.0, 520.0, 0.9));
    }
    if let Some(body) = slide.body.as_deref().filter(|s| !s.is_empty()) {
        let y = if slide.subtitle.as_deref().is_some_and(|s| !s.is_empty()) {
            650.0
        } else {
            560.0
        };
        elements.push(text_element(TextKind::Body, body, 90.0, y, 1.0));
    }

    EditorSlide {
        id: create_id("slide"),
        format: format_from_preset(SlideFormatPreset::LinkedinPortrait),
        background_color: "#000012".to_string(),
        elements,
    }
}

/// Expand a generated deck into an editable deck via fixed layout rules.
#[must_use]
pub fn api_deck_to_editor(deck: &Deck) -> EditorDeck {
    EditorDeck {
        title: deck.title.clone(),
        slides: deck
            .slides
            .iter()
            .enumerate()
            .map(|(idx, slide)| api_slide_to_editor(slide, idx))
            .collect(),
    }
}

/// The built-in starter deck shown before anything is generated or imported.
#[must_use]
pub fn default_editor_deck() -> EditorDeck {
    let slide = |title: &str, subtitle: Option<&str>, body: &str| Slide {
        title: title.to_string(),
        subtitle: subtitle.map(str::to_string),
        body: Some(body.to_string()),
        bullets: None,
        footer: None,
    };
    let api = Deck {
        title: "Coding in 2026".to_string(),
        slides: vec![
            slide(
                "Coding in 2026: Beyond Syntax",
                Some("Why systems literacy matters more than memorizing code"),
                "AI tools have changed programming, but real value comes from modularity, \
                 systems thinking, and intent — not just syntax.",
            ),
            slide(
                "Syntax is Easy to Outsource",
                None,
                "Language rules aren't the bottleneck. LLMs wire features, fix typos, and \
                 generate UI & backend code in seconds.",
            ),
            slide(
                "Understanding the Machine",
                Some("What's happening behind the scenes?"),
                "When a feature \"looks fine\" but something's off, you need to grasp state, \
                 flow, and what code does on every request.",
            ),
            slide(
                "LLMs Suggest. Humans Decide.",
                None,
                "Patterns help you reason about tradeoffs, errors, and failure modes. But \
                 humans spot intent and context.",
            ),
        ],
    };
    api_deck_to_editor(&api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_mapping() {
        let portrait = format_from_preset(SlideFormatPreset::LinkedinPortrait);
        assert_eq!((portrait.width, portrait.height), LINKEDIN_PORTRAIT);

        let square = format_from_preset(SlideFormatPreset::LinkedinSquare);
        assert_eq!((square.width, square.height), LINKEDIN_SQUARE);

        // Custom starts out portrait-sized.
        let custom = format_from_preset(SlideFormatPreset::Custom);
        assert_eq!(custom.preset, SlideFormatPreset::Custom);
        assert_eq!((custom.width, custom.height), LINKEDIN_PORTRAIT);
    }

    #[test]
    fn ids_carry_prefix_and_do_not_repeat() {
        let a = create_id("el");
        let b = create_id("el");
        assert!(a.starts_with("el_"));
        assert_ne!(a, b);
    }

    #[test]
    fn reorder_is_a_permutation() {
        let list = vec!["a", "b", "c", "d", "e"];
        let moved = reorder(&list, 1, 3);
        assert_eq!(moved, ["a", "c", "d", "b", "e"]);

        let mut sorted = moved.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn reorder_round_trips() {
        let list = vec![1, 2, 3, 4, 5, 6];
        for from in 0..list.len() {
            for to in 0..list.len() {
                let back = reorder(&reorder(&list, from, to), to, from);
                assert_eq!(back, list, "from={from} to={to}");
            }
        }
    }

    #[test]
    fn reorder_out_of_range_is_identity() {
        let list = vec![1, 2, 3];
        assert_eq!(reorder(&list, 9, 0), list);
        assert_eq!(reorder(&list, 0, 9), [2, 3, 1]);
    }

    #[test]
    fn expansion_always_creates_a_title() {
        let slide = Slide {
            title: "Hello".to_string(),
            subtitle: None,
            body: None,
            bullets: None,
            footer: None,
        };
        let editor = api_slide_to_editor(&slide, 0);
        assert_eq!(editor.elements.len(), 1);
        match &editor.elements[0] {
            SlideElement::Text(el) => {
                assert_eq!(el.kind, TextKind::Title);
                assert_eq!(el.text, "Hello");
                assert_eq!((el.x, el.y), (90.0, 160.0));
                assert_eq!(el.font_weight, FontWeight::Bold);
                assert_eq!(el.font_size, 112.0);
            }
            SlideElement::Image(_) => panic!("expected a text element"),
        }
        assert_eq!(editor.background_color, "#000012");
        assert_eq!(editor.format.preset, SlideFormatPreset::LinkedinPortrait);
    }

    #[test]
    fn body_offset_depends_on_subtitle() {
        let body_y = |subtitle: Option<&str>| {
            let slide = Slide {
                title: "T".to_string(),
                subtitle: subtitle.map(str::to_string),
                body: Some("B".to_string()),
                bullets: None,
                footer: None,
            };
            let editor = api_slide_to_editor(&slide, 0);
            match editor.elements.last().expect("body element") {
                SlideElement::Text(el) => {
                    assert_eq!(el.kind, TextKind::Body);
                    el.y
                }
                SlideElement::Image(_) => panic!("expected a text element"),
            }
        };
        assert_eq!(body_y(Some("sub")), 650.0);
        assert_eq!(body_y(None), 560.0);
    }

    #[test]
    fn element_union_serializes_with_type_tag() {
        let el = SlideElement::Image(ImageElement {
            id: "el_1".to_string(),
            src: "data:image/png;base64,AAAA".to_string(),
            x: 1.0,
            y: 2.0,
            w: 3.0,
            h: 4.0,
            opacity: 0.5,
        });
        let json = serde_json::to_value(&el).expect("serialize");
        assert_eq!(json["type"], "image");
        assert_eq!(json["src"], "data:image/png;base64,AAAA");

        let text = serde_json::json!({
            "id": "el_2", "type": "text", "kind": "body", "text": "hi",
            "x": 0, "y": 0, "w": 10, "h": 10, "color": "#fff",
            "fontSize": 46, "lineHeight": 1.35, "fontWeight": 400,
            "align": "left", "opacity": 1,
        });
        let parsed: SlideElement = serde_json::from_value(text).expect("deserialize");
        match parsed {
            SlideElement::Text(el) => assert_eq!(el.font_weight, FontWeight::Regular),
            SlideElement::Image(_) => panic!("expected text"),
        }
    }

    #[test]
    fn font_weight_rejects_unknown_values() {
        let result: Result<FontWeight, _> = serde_json::from_value(serde_json::json!(500));
        assert!(result.is_err());
    }

    #[test]
    fn default_deck_expands_to_four_slides() {
        let deck = default_editor_deck();
        assert_eq!(deck.title, "Coding in 2026");
        assert_eq!(deck.slides.len(), 4);
        // Slides with a subtitle get three elements, others two.
        assert_eq!(deck.slides[0].elements.len(), 3);
        assert_eq!(deck.slides[1].elements.len(), 2);
    }
}
