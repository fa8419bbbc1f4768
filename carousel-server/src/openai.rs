//! Upstream generation client.
//!
//! Talks to the model provider's Responses API in strict structured-output
//! mode, extracts the deck JSON from whichever response shape comes back,
//! and repairs the slide count before handing the deck to the route layer.

use serde_json::{json, Value};
use thiserror::Error;

use carousel_core::deck::{
    validate_deck, Deck, GenerateRequest, MAX_BULLETS, MAX_SLIDE_COUNT, MIN_SLIDE_COUNT,
};

use crate::config::ServerConfig;

/// Longest upstream error snippet surfaced to clients.
const MAX_ERROR_SNIPPET: usize = 240;

/// Failures while producing a deck.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Upstream returned a non-success status.
    #[error("Model API error ({status}): {message}")]
    UpstreamHttp {
        /// HTTP status code from upstream.
        status: u16,
        /// Classified error snippet from the response body.
        message: String,
    },

    /// Upstream responded 2xx but the payload was unusable.
    #[error("Unexpected model response: {0}")]
    UpstreamResponse(String),

    /// The model produced JSON that is not a valid deck.
    #[error("Model produced an invalid deck: {0}")]
    InvalidDeck(String),

    /// Network-level failure.
    #[error("Failed to reach the model API: {0}")]
    Transport(#[from] reqwest::Error),
}

/// JSON Schema for the deck, in the provider's strict structured-output
/// dialect: every property listed in `required`, optional content expressed
/// as nullable types.
#[must_use]
pub fn deck_json_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "slides"],
        "properties": {
            "title": { "type": "string" },
            "slides": {
                "type": "array",
                "minItems": MIN_SLIDE_COUNT,
                "maxItems": MAX_SLIDE_COUNT,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["title", "subtitle", "body", "bullets", "footer"],
                    "properties": {
                        "title": { "type": "string" },
                        "subtitle": { "type": ["string", "null"] },
                        "body": { "type": ["string", "null"] },
                        "bullets": {
                            "type": ["array", "null"],
                            "maxItems": MAX_BULLETS,
                            "items": { "type": "string" }
                        },
                        "footer": { "type": ["string", "null"] }
                    }
                }
            }
        }
    })
}

fn system_prompt(product_context: Option<&str>) -> String {
    let mut prompt = String::from(
        "You write LinkedIn carousel decks. Produce punchy, skimmable slides: \
         a short hook title per slide, an optional subtitle, and either a \
         2-3 sentence body or up to 8 tight bullets. Never use hashtags or \
         emoji. Return JSON only.",
    );
    if let Some(context) = product_context {
        prompt.push_str("\n\nProduct context:\n");
        prompt.push_str(context);
    }
    prompt
}

fn user_prompt(request: &GenerateRequest) -> String {
    let mut prompt = format!(
        "Topic: {}\nSlide count: exactly {} slides.",
        request.prompt, request.slide_count
    );
    if let Some(audience) = &request.audience {
        prompt.push_str(&format!("\nAudience: {audience}"));
    }
    if let Some(tone) = &request.tone {
        prompt.push_str(&format!("\nTone: {tone}"));
    }
    prompt
}

/// Request body for the Responses API with strict schema enforcement.
#[must_use]
pub fn build_request_body(
    model: &str,
    request: &GenerateRequest,
    product_context: Option<&str>,
) -> Value {
    json!({
        "model": model,
        "input": [
            { "role": "system", "content": system_prompt(product_context) },
            { "role": "user", "content": user_prompt(request) }
        ],
        "text": {
            "format": {
                "type": "json_schema",
                "name": "carousel_deck",
                "strict": true,
                "schema": deck_json_schema()
            }
        }
    })
}

/// Pull the generated text out of a successful upstream response.
///
/// Providers have shipped three shapes for this payload: a top-level
/// `output_text` convenience field, the canonical `output[].content[].text`
/// blocks, and the chat-completions `choices[0].message.content`. All three
/// are accepted.
#[must_use]
pub fn extract_output_text(response: &Value) -> Option<String> {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    if let Some(output) = response.get("output").and_then(Value::as_array) {
        let mut combined = String::new();
        for item in output {
            let Some(content) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for block in content {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    combined.push_str(text);
                }
            }
        }
        if !combined.is_empty() {
            return Some(combined);
        }
    }

    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.pointer("/message/content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Distill an upstream error body into a short, displayable message.
///
/// JSON bodies surface `error.message` or `message`; anything else is
/// treated as text, HTML tags dropped, whitespace collapsed, and the result
/// truncated to a readable snippet.
#[must_use]
pub fn classify_error_body(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        let message = parsed
            .pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| parsed.get("message").and_then(Value::as_str));
        if let Some(message) = message {
            return truncate_chars(message.trim(), MAX_ERROR_SNIPPET);
        }
    }

    let stripped = strip_html(body);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "Unknown upstream error".to_string()
    } else {
        truncate_chars(&collapsed, MAX_ERROR_SNIPPET)
    }
}

fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn truncate_chars(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        input.to_string()
    } else {
        let truncated: String = input.chars().take(max).collect();
        format!("{truncated}…")
    }
}

/// Generate a deck for a validated request.
///
/// The returned deck is schema-valid and has exactly the requested number of
/// slides; count deviations from the model are repaired silently.
///
/// # Errors
///
/// Returns [`GenerateError`] for transport failures, upstream error statuses,
/// unusable response payloads, and decks that fail validation.
pub async fn generate_deck(
    client: &reqwest::Client,
    config: &ServerConfig,
    api_key: &str,
    request: &GenerateRequest,
) -> Result<Deck, GenerateError> {
    let body = build_request_body(&config.model, request, config.product_context.as_deref());

    tracing::info!(
        model = %config.model,
        slide_count = request.slide_count,
        "requesting deck generation"
    );
    let response = client
        .post(config.responses_url())
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = classify_error_body(&text);
        tracing::warn!(status = status.as_u16(), %message, "upstream rejected generation");
        return Err(GenerateError::UpstreamHttp {
            status: status.as_u16(),
            message,
        });
    }

    let payload: Value = serde_json::from_str(&text)
        .map_err(|e| GenerateError::UpstreamResponse(format!("non-JSON body: {e}")))?;
    let output = extract_output_text(&payload)
        .ok_or_else(|| GenerateError::UpstreamResponse("no text output in response".to_string()))?;

    let mut deck: Deck = serde_json::from_str(&output)
        .map_err(|e| GenerateError::InvalidDeck(format!("malformed deck JSON: {e}")))?;

    // Validation comes first: a deck outside the schema bounds is an error,
    // not a repair candidate. Only count drift within bounds gets repaired.
    validate_deck(&deck).map_err(|e| GenerateError::InvalidDeck(e.to_string()))?;
    deck.conform_slide_count(request.slide_count);

    tracing::info!(slides = deck.slides.len(), title = %deck.title, "deck generated");
    Ok(deck)
}
