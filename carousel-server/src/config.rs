//! Server configuration from environment variables.

use std::path::PathBuf;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default upstream API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Model used when none is configured or the configured one is retired.
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Upstream API key; generation returns an error without one.
    pub api_key: Option<String>,
    /// Model identifier sent upstream.
    pub model: String,
    /// Upstream API base URL, no trailing slash.
    pub api_base: String,
    /// Extra allowed CORS origin, e.g. a dev server.
    pub cors_origin: Option<String>,
    /// Listen port.
    pub port: u16,
    /// Directory holding the built frontend.
    pub dist_dir: PathBuf,
    /// Product context prepended to the generation system prompt.
    pub product_context: Option<String>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset or unparseable values fall back to defaults; a missing API key
    /// is allowed so the static frontend still serves.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let model = normalize_model(std::env::var("OPENAI_MODEL").ok().as_deref());

        let api_base = std::env::var("OPENAI_API_BASE")
            .ok()
            .map(|b| b.trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let cors_origin = std::env::var("CORS_ORIGIN")
            .ok()
            .filter(|o| !o.is_empty());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let dist_dir = std::env::var("DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("dist"));

        let product_context = load_product_context();

        if api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; /api/generate will return errors");
        }

        Self {
            api_key,
            model,
            api_base,
            cors_origin,
            port,
            dist_dir,
            product_context,
        }
    }

    /// Full URL of the upstream responses endpoint.
    #[must_use]
    pub fn responses_url(&self) -> String {
        format!("{}/responses", self.api_base)
    }
}

/// Map a configured model name to the one actually sent upstream.
///
/// Blank values and the retired `gpt-5.2-low` alias both resolve to
/// [`DEFAULT_MODEL`].
#[must_use]
pub fn normalize_model(configured: Option<&str>) -> String {
    match configured.map(str::trim) {
        None | Some("") | Some("gpt-5.2-low") => DEFAULT_MODEL.to_string(),
        Some(model) => model.to_string(),
    }
}

/// Load `prd.md` from the working directory, if present.
///
/// The file gives the generator product context so decks match the app's
/// voice; its absence is not an error.
fn load_product_context() -> Option<String> {
    match std::fs::read_to_string("prd.md") {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(%err, "no prd.md product context");
            None
        }
    }
}
