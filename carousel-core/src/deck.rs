//! Generated deck schema and validation.
//!
//! These types mirror the wire format of the generation API round trip:
//! a [`GenerateRequest`] goes out, a [`Deck`] comes back. Optional slide
//! content is an explicit `null` on the wire, never an omitted field or an
//! empty string, because the upstream structured-output mode requires every
//! object property to be present.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum prompt length in characters.
pub const MAX_PROMPT_LEN: usize = 20_000;
/// Minimum number of slides per deck.
pub const MIN_SLIDE_COUNT: usize = 4;
/// Maximum number of slides per deck.
pub const MAX_SLIDE_COUNT: usize = 10;
/// Default slide count when the request omits one.
pub const DEFAULT_SLIDE_COUNT: usize = 5;
/// Maximum audience/tone hint length.
pub const MAX_HINT_LEN: usize = 200;
/// Maximum deck title length.
pub const MAX_DECK_TITLE_LEN: usize = 120;
/// Maximum slide title length.
pub const MAX_SLIDE_TITLE_LEN: usize = 90;
/// Maximum slide subtitle length.
pub const MAX_SUBTITLE_LEN: usize = 140;
/// Maximum slide body length.
pub const MAX_BODY_LEN: usize = 520;
/// Maximum number of bullets per slide.
pub const MAX_BULLETS: usize = 8;
/// Maximum length of a single bullet.
pub const MAX_BULLET_LEN: usize = 90;
/// Maximum slide footer length.
pub const MAX_FOOTER_LEN: usize = 80;

/// A request to generate a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Topic description supplied by the user.
    pub prompt: String,
    /// Requested number of slides, clamped to [4, 10] by validation.
    #[serde(default = "default_slide_count")]
    pub slide_count: usize,
    /// Optional audience hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Optional tone hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

const fn default_slide_count() -> usize {
    DEFAULT_SLIDE_COUNT
}

/// One generated slide, prior to positional layout.
///
/// Absent content must be an explicit `null` on the wire; an omitted key is
/// a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide headline (required, non-empty).
    pub title: String,
    /// Optional subtitle; `null` when absent.
    #[serde(deserialize_with = "explicit_null")]
    pub subtitle: Option<String>,
    /// Optional body paragraph; `null` when absent.
    #[serde(deserialize_with = "explicit_null")]
    pub body: Option<String>,
    /// Optional bullet list; `null` when absent.
    #[serde(deserialize_with = "explicit_null")]
    pub bullets: Option<Vec<String>>,
    /// Optional footer line; `null` when absent.
    #[serde(deserialize_with = "explicit_null")]
    pub footer: Option<String>,
}

/// Requires the key to be present while still accepting `null`.
///
/// Serde treats bare `Option` fields as implicitly defaultable; routing them
/// through a custom deserializer turns a missing key back into an error.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer)
}

impl Slide {
    /// Filler slide appended when the generator returns too few slides.
    #[must_use]
    pub fn filler() -> Self {
        Self {
            title: "New slide".to_string(),
            subtitle: None,
            body: None,
            bullets: None,
            footer: None,
        }
    }
}

/// A generated deck: title plus an ordered list of slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Deck title.
    pub title: String,
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Force the slide count to match the request.
    ///
    /// The generator occasionally deviates from the requested count; to keep
    /// the consumer predictable, excess slides are truncated from the end and
    /// missing slides are padded with [`Slide::filler`]. This is a repair
    /// step, not a validation failure.
    pub fn conform_slide_count(&mut self, count: usize) {
        if self.slides.len() == count {
            return;
        }
        tracing::debug!(
            got = self.slides.len(),
            want = count,
            "repairing deck slide count"
        );
        self.slides.truncate(count);
        while self.slides.len() < count {
            self.slides.push(Slide::filler());
        }
    }
}

/// Validation issue codes, mirroring the original schema library's taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Wrong JSON type or unparseable body.
    InvalidType,
    /// Value below a minimum bound (or string/array too short).
    TooSmall,
    /// Value above a maximum bound (or string/array too long).
    TooBig,
}

/// A single field-level validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dotted path to the offending field (empty for the document root).
    pub path: String,
    /// Machine-readable issue code.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    fn new(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

/// Malformed or out-of-bounds input, carrying field-level issues.
#[derive(Debug, Clone, Error)]
#[error("invalid input: {}", summary(&self.issues))]
pub struct ValidationError {
    /// Field-level issues, in document order.
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// True if any issue reports an over-long prompt.
    ///
    /// Surfaced separately so callers can show a friendlier message than the
    /// raw issue list.
    #[must_use]
    pub fn prompt_too_long(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.path == "prompt" && i.code == IssueCode::TooBig)
    }
}

fn summary(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| {
            if i.path.is_empty() {
                i.message.clone()
            } else {
                format!("{}: {}", i.path, i.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Character count, not byte count. Bounds are hard limits on text the user
/// or generator supplies, so they must not depend on UTF-8 encoding width.
fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn check_len(issues: &mut Vec<Issue>, path: &str, value: &str, min: usize, max: usize) {
    let len = char_len(value);
    if len < min {
        issues.push(Issue::new(
            path,
            IssueCode::TooSmall,
            format!("must contain at least {min} character(s)"),
        ));
    } else if len > max {
        issues.push(Issue::new(
            path,
            IssueCode::TooBig,
            format!("must contain at most {max} character(s)"),
        ));
    }
}

/// Validate a raw request body against the [`GenerateRequest`] schema.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every bound violation: empty or
/// over-long prompt, slide count outside [4, 10], or over-long hints.
pub fn validate_request(body: &serde_json::Value) -> Result<GenerateRequest, ValidationError> {
    let request: GenerateRequest = match serde_json::from_value(body.clone()) {
        Ok(request) => request,
        Err(err) => {
            return Err(ValidationError {
                issues: vec![Issue::new("", IssueCode::InvalidType, err.to_string())],
            })
        }
    };

    let mut issues = Vec::new();
    check_len(&mut issues, "prompt", &request.prompt, 1, MAX_PROMPT_LEN);
    if request.slide_count < MIN_SLIDE_COUNT {
        issues.push(Issue::new(
            "slideCount",
            IssueCode::TooSmall,
            format!("must be at least {MIN_SLIDE_COUNT}"),
        ));
    } else if request.slide_count > MAX_SLIDE_COUNT {
        issues.push(Issue::new(
            "slideCount",
            IssueCode::TooBig,
            format!("must be at most {MAX_SLIDE_COUNT}"),
        ));
    }
    if let Some(audience) = &request.audience {
        check_len(&mut issues, "audience", audience, 0, MAX_HINT_LEN);
    }
    if let Some(tone) = &request.tone {
        check_len(&mut issues, "tone", tone, 0, MAX_HINT_LEN);
    }

    if issues.is_empty() {
        Ok(request)
    } else {
        Err(ValidationError { issues })
    }
}

fn check_optional(issues: &mut Vec<Issue>, path: &str, value: Option<&String>, max: usize) {
    if let Some(value) = value {
        check_len(issues, path, value, 0, max);
    }
}

/// Validate a deck candidate against the schema bounds.
///
/// Used both for generator output before it is returned to the caller and
/// for legacy project imports.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every bound violation.
pub fn validate_deck(deck: &Deck) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    check_len(&mut issues, "title", &deck.title, 1, MAX_DECK_TITLE_LEN);

    if deck.slides.len() < MIN_SLIDE_COUNT {
        issues.push(Issue::new(
            "slides",
            IssueCode::TooSmall,
            format!("must contain at least {MIN_SLIDE_COUNT} slide(s)"),
        ));
    } else if deck.slides.len() > MAX_SLIDE_COUNT {
        issues.push(Issue::new(
            "slides",
            IssueCode::TooBig,
            format!("must contain at most {MAX_SLIDE_COUNT} slide(s)"),
        ));
    }

    for (idx, slide) in deck.slides.iter().enumerate() {
        let at = |field: &str| format!("slides.{idx}.{field}");
        check_len(&mut issues, &at("title"), &slide.title, 1, MAX_SLIDE_TITLE_LEN);
        check_optional(&mut issues, &at("subtitle"), slide.subtitle.as_ref(), MAX_SUBTITLE_LEN);
        check_optional(&mut issues, &at("body"), slide.body.as_ref(), MAX_BODY_LEN);
        check_optional(&mut issues, &at("footer"), slide.footer.as_ref(), MAX_FOOTER_LEN);
        if let Some(bullets) = &slide.bullets {
            if bullets.len() > MAX_BULLETS {
                issues.push(Issue::new(
                    at("bullets"),
                    IssueCode::TooBig,
                    format!("must contain at most {MAX_BULLETS} bullet(s)"),
                ));
            }
            for (bi, bullet) in bullets.iter().enumerate() {
                check_len(&mut issues, &at(&format!("bullets.{bi}")), bullet, 1, MAX_BULLET_LEN);
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slide(title: &str) -> Slide {
        Slide {
            title: title.to_string(),
            subtitle: None,
            body: None,
            bullets: None,
            footer: None,
        }
    }

    fn deck(n: usize) -> Deck {
        Deck {
            title: "Test deck".to_string(),
            slides: (0..n).map(|i| slide(&format!("Slide {i}"))).collect(),
        }
    }

    #[test]
    fn request_defaults_slide_count() {
        let req = validate_request(&json!({ "prompt": "launch a new CLI" })).expect("valid");
        assert_eq!(req.slide_count, DEFAULT_SLIDE_COUNT);
        assert_eq!(req.audience, None);
        assert_eq!(req.tone, None);
    }

    #[test]
    fn request_accepts_bounds() {
        let req = validate_request(&json!({
            "prompt": "p".repeat(MAX_PROMPT_LEN),
            "slideCount": 10,
            "audience": "a".repeat(MAX_HINT_LEN),
            "tone": "t".repeat(MAX_HINT_LEN),
        }))
        .expect("at-limit request should pass");
        assert_eq!(req.slide_count, 10);
    }

    #[test]
    fn request_rejects_empty_prompt() {
        let err = validate_request(&json!({ "prompt": "" })).unwrap_err();
        assert_eq!(err.issues[0].path, "prompt");
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
        assert!(!err.prompt_too_long());
    }

    #[test]
    fn request_rejects_long_prompt_with_marker() {
        let err =
            validate_request(&json!({ "prompt": "p".repeat(MAX_PROMPT_LEN + 1) })).unwrap_err();
        assert!(err.prompt_too_long());
    }

    #[test]
    fn request_rejects_slide_count_out_of_range() {
        for (count, code) in [(3, IssueCode::TooSmall), (11, IssueCode::TooBig)] {
            let err =
                validate_request(&json!({ "prompt": "x", "slideCount": count })).unwrap_err();
            assert_eq!(err.issues[0].path, "slideCount");
            assert_eq!(err.issues[0].code, code);
        }
    }

    #[test]
    fn request_rejects_long_hints() {
        let err = validate_request(&json!({
            "prompt": "x",
            "audience": "a".repeat(MAX_HINT_LEN + 1),
            "tone": "t".repeat(MAX_HINT_LEN + 1),
        }))
        .unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["audience", "tone"]);
    }

    #[test]
    fn request_rejects_non_object_body() {
        let err = validate_request(&json!("just a string")).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn bounds_count_chars_not_bytes() {
        // 200 two-byte chars are within a 200-char bound.
        let err = validate_request(&json!({ "prompt": "x", "audience": "é".repeat(MAX_HINT_LEN) }));
        assert!(err.is_ok());
    }

    #[test]
    fn deck_at_bounds_is_valid() {
        let mut d = deck(4);
        d.slides[0].subtitle = Some("s".repeat(MAX_SUBTITLE_LEN));
        d.slides[0].body = Some("b".repeat(MAX_BODY_LEN));
        d.slides[0].footer = Some("f".repeat(MAX_FOOTER_LEN));
        d.slides[0].bullets = Some(vec!["b".repeat(MAX_BULLET_LEN); MAX_BULLETS]);
        assert!(validate_deck(&d).is_ok());
    }

    #[test]
    fn deck_rejects_slide_count_out_of_range() {
        assert!(validate_deck(&deck(3)).is_err());
        assert!(validate_deck(&deck(11)).is_err());
        assert!(validate_deck(&deck(4)).is_ok());
        assert!(validate_deck(&deck(10)).is_ok());
    }

    #[test]
    fn deck_rejects_field_overflow_with_paths() {
        let mut d = deck(4);
        d.slides[1].title = "t".repeat(MAX_SLIDE_TITLE_LEN + 1);
        d.slides[2].bullets = Some(vec![String::new()]);
        let err = validate_deck(&d).unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["slides.1.title", "slides.2.bullets.0"]);
    }

    #[test]
    fn conform_truncates_from_the_end() {
        let mut d = deck(8);
        d.conform_slide_count(5);
        assert_eq!(d.slides.len(), 5);
        assert_eq!(d.slides[4].title, "Slide 4");
    }

    #[test]
    fn conform_pads_with_filler() {
        let mut d = deck(4);
        d.conform_slide_count(7);
        assert_eq!(d.slides.len(), 7);
        let filler = &d.slides[6];
        assert_eq!(filler.title, "New slide");
        assert_eq!(filler.subtitle, None);
        assert_eq!(filler.body, None);
        assert_eq!(filler.bullets, None);
        assert_eq!(filler.footer, None);
    }

    #[test]
    fn slide_serializes_explicit_nulls() {
        let json = serde_json::to_value(Slide::filler()).expect("serialize");
        let obj = json.as_object().expect("object");
        for field in ["subtitle", "body", "bullets", "footer"] {
            assert!(obj.contains_key(field), "{field} must be present");
            assert!(obj[field].is_null(), "{field} must be null");
        }
    }

    #[test]
    fn slide_rejects_omitted_fields() {
        // Strict wire shape: absent optional content must be an explicit null.
        let result: Result<Slide, _> = serde_json::from_value(json!({ "title": "only" }));
        assert!(result.is_err());

        // Each optional key must be present, not just some of them.
        for missing in ["subtitle", "body", "bullets", "footer"] {
            let mut value = serde_json::to_value(Slide::filler()).expect("serialize");
            value.as_object_mut().expect("object").remove(missing);
            let result: Result<Slide, _> = serde_json::from_value(value);
            assert!(result.is_err(), "omitting {missing} must fail");
        }

        // Explicit nulls still parse.
        let slide: Slide = serde_json::from_value(json!({
            "title": "ok", "subtitle": null, "body": null,
            "bullets": null, "footer": null,
        }))
        .expect("explicit nulls are the valid shape");
        assert_eq!(slide.subtitle, None);
    }
}
