//! Rewrite engine: original article + reference excerpts → rewritten
//! title/body pair.
//!
//! Invokes the generative model once per run with a fixed-structure
//! prompt, requesting JSON-typed output. The model may still wrap its
//! response in code-fence markers; those are stripped before parsing.
//! Provider errors, malformed responses, and parse failures all collapse
//! to `None` — the orchestrator treats that as "no rewrite" and halts.
//! Never retries.

mod prompt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use articleforge_shared::{Article, ArticleForgeError, Result, RuntimeConfig};

/// Timeout in seconds for the model call. Generation is slow; this is
/// deliberately far above the page-fetch timeout.
const MODEL_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Wire types (generateContent REST surface)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// RewriteResult
// ---------------------------------------------------------------------------

/// The strict JSON shape the model must return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewriteResult {
    /// Rewritten title.
    pub title: String,
    /// Rewritten body (markdown).
    pub body: String,
}

// ---------------------------------------------------------------------------
// Rewriter
// ---------------------------------------------------------------------------

/// Invokes the generative model to rewrite one article.
#[derive(Debug, Clone)]
pub struct Rewriter {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_content_chars: usize,
}

impl Rewriter {
    /// Build a rewriter from the resolved runtime configuration.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(MODEL_TIMEOUT_SECS))
            .build()
            .map_err(|e| ArticleForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.rewrite_base_url.clone(),
            api_key: config.rewrite_api_key.clone(),
            model: config.model.clone(),
            max_content_chars: config.excerpt_max_chars,
        })
    }

    /// Rewrite an article against its reference excerpts.
    ///
    /// Returns `None` on any provider or parse failure; never returns
    /// an `Err` to the caller.
    #[instrument(skip_all, fields(article_id = original.id, title = %original.title))]
    pub async fn rewrite(&self, original: &Article, excerpts: &[String]) -> Option<RewriteResult> {
        info!("invoking rewrite model");

        match self.generate(original, excerpts).await {
            Ok(result) => {
                info!(new_title = %result.title, "rewrite complete");
                Some(result)
            }
            Err(e) => {
                warn!(error = %e, "rewrite failed");
                None
            }
        }
    }

    async fn generate(&self, original: &Article, excerpts: &[String]) -> Result<RewriteResult> {
        let content = truncate_chars(&original.content, self.max_content_chars);
        let prompt = prompt::build_prompt(&original.title, content, excerpts);

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ArticleForgeError::Rewrite(format!("model request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleForgeError::Rewrite(format!(
                "model returned HTTP {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ArticleForgeError::Rewrite(format!("model response: {e}")))?;

        let text = response_text(&body)?;
        parse_result(&text)
    }
}

/// Pull the concatenated text out of the first candidate.
fn response_text(response: &GenerateResponse) -> Result<String> {
    let content = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .ok_or_else(|| ArticleForgeError::Rewrite("model returned no candidates".into()))?;

    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
    if text.trim().is_empty() {
        return Err(ArticleForgeError::Rewrite("model returned empty text".into()));
    }
    Ok(text)
}

/// Strip code-fence markers the model may still emit around its JSON,
/// then parse the remainder.
fn parse_result(text: &str) -> Result<RewriteResult> {
    let clean = text.replace("```json", "").replace("```", "");
    serde_json::from_str(clean.trim())
        .map_err(|e| ArticleForgeError::parse(format!("rewrite JSON: {e}")))
}

/// Truncate at a character boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
