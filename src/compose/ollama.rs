//! Remote answer composition over the Ollama generation API.
//!
//! [`OllamaClient`] wraps the single operation the core needs from the
//! service — generate text from a prompt with sampling options — and
//! [`OllamaComposer`] layers the citation-grounded prompt and the `[n]`
//! citation scanner on top of it. Every transport, status, or body
//! failure collapses into one [`RagError::Remote`]; there are no
//! retries, no backoff, and no partial results.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::compose::AnswerComposer;
use crate::types::{Citation, ComposedAnswer, Context, RagError};

/// Character budget per enumerated source in the prompt.
const MAX_SOURCE_CHARS: usize = 1200;
/// Marker appended to truncated sources.
const TRUNCATION_MARKER: char = '…';

static CITATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));

/// Connection settings for the Ollama composer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub host: String,
    /// Model name passed to the generate endpoint.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout for the blocking generation call.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(120),
        }
    }
}

impl OllamaConfig {
    /// Defaults overridden by `OLLAMA_HOST` and `OLLAMA_MODEL`.
    ///
    /// A `.env` file is loaded best-effort first, so local setups work
    /// without exporting anything.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            config.host = host;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.model = model;
        }
        config
    }
}

/// Sampling options forwarded to the generate endpoint.
///
/// `temperature` is the only option the core sets; anything else the
/// service understands can be added through
/// [`with_option`](Self::with_option) and is flattened into the same
/// JSON object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling randomness.
    pub temperature: f32,
    #[serde(flatten)]
    extra: FxHashMap<String, serde_json::Value>,
}

impl GenerateOptions {
    /// Options with the given temperature and nothing else.
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }

    /// Add an additional service option, e.g. `num_predict`.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Thin client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    host: Url,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] when the host is not a valid URL.
    pub fn new(host: &str) -> Result<Self, RagError> {
        let host = Url::parse(host)
            .map_err(|err| RagError::Config(format!("invalid Ollama host '{host}': {err}")))?;
        Ok(Self {
            host,
            http: reqwest::Client::new(),
        })
    }

    /// Generate text from a prompt, blocking up to `timeout`.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status, or malformed body is
    /// a [`RagError::Remote`].
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerateOptions,
        timeout: Duration,
    ) -> Result<String, RagError> {
        let url = self
            .host
            .join("api/generate")
            .map_err(|err| RagError::Config(format!("invalid Ollama host: {err}")))?;

        tracing::debug!(%url, model, prompt_chars = prompt.chars().count(), "requesting generation");

        let response = self
            .http
            .post(url.clone())
            .timeout(timeout)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
                options,
            })
            .send()
            .await
            .map_err(|err| RagError::Remote(format!("failed to reach {url}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::Remote(format!("{url} returned status {status}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| RagError::Remote(format!("malformed response from {url}: {err}")))?;
        Ok(body.response)
    }
}

/// Composer backed by a remote generation service.
///
/// The prompt demands citation-only answers over an enumerated source
/// list; the generated text is then scanned for bracketed source
/// numbers which become the citations. The service call is best-effort:
/// one request, one timeout, and failure fails the whole `answer()`
/// call.
pub struct OllamaComposer {
    client: OllamaClient,
    config: OllamaConfig,
}

impl OllamaComposer {
    /// Build a composer from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] when the configured host is not a
    /// valid URL.
    pub fn new(config: OllamaConfig) -> Result<Self, RagError> {
        Ok(Self {
            client: OllamaClient::new(&config.host)?,
            config,
        })
    }

    /// Build a composer from [`OllamaConfig::from_env`].
    pub fn from_env() -> Result<Self, RagError> {
        Self::new(OllamaConfig::from_env())
    }

    fn build_prompt(query: &str, contexts: &[Context]) -> String {
        let mut lines = vec![
            "You are a financial RAG assistant. Answer ONLY using the provided sources."
                .to_string(),
            "If the answer is not contained in the sources, say: 'I don't know based on the provided sources.'"
                .to_string(),
            "Cite sources with bracketed numbers like [1], [2] corresponding to the source list."
                .to_string(),
            "Be concise and factual. No speculation.".to_string(),
            "\nQuestion:".to_string(),
            query.to_string(),
            "\nSources:".to_string(),
        ];
        for (index, context) in contexts.iter().enumerate() {
            lines.push(format!(
                "[{}] ({})\n{}",
                index + 1,
                context.source,
                truncate_chars(&context.text, MAX_SOURCE_CHARS)
            ));
        }
        lines.push("\nAnswer (with citations):".to_string());
        lines.join("\n")
    }

    /// Map bracketed source numbers in the generated text to citations.
    ///
    /// Out-of-range numbers are ignored; duplicates collapse to the
    /// first occurrence. Whole sources are cited, so `line` is fixed
    /// at 1.
    fn extract_citations(answer: &str, contexts: &[Context]) -> Vec<Citation> {
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let mut citations = Vec::new();
        for capture in CITATION_RE.captures_iter(answer) {
            let Ok(number) = capture[1].parse::<usize>() else {
                continue;
            };
            if (1..=contexts.len()).contains(&number) && seen.insert(number) {
                citations.push(Citation {
                    source: contexts[number - 1].source.clone(),
                    line: 1,
                });
            }
        }
        citations
    }
}

#[async_trait]
impl AnswerComposer for OllamaComposer {
    async fn compose(
        &self,
        query: &str,
        contexts: &[Context],
    ) -> Result<ComposedAnswer, RagError> {
        let prompt = Self::build_prompt(query, contexts);
        let options = GenerateOptions::with_temperature(self.config.temperature);
        let answer = self
            .client
            .generate(&self.config.model, &prompt, &options, self.config.timeout)
            .await?;
        let citations = Self::extract_citations(&answer, contexts);

        tracing::debug!(
            contexts = contexts.len(),
            citations = citations.len(),
            "composed remote answer"
        );

        Ok(ComposedAnswer { answer, citations })
    }
}

fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(budget).collect();
    truncated.push(TRUNCATION_MARKER);
    truncated
}
