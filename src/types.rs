//! Shared error and boundary types for the retrieval core.
//!
//! Everything a presentation layer consumes (retrieval hits, composed
//! answers, citations) lives here so the other modules stay focused on
//! behavior. All boundary types carry serde derives; an HTTP handler or
//! CLI printer can serialize an [`AnswerResult`] directly.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for retrieval and composition operations.
///
/// The taxonomy is deliberately small:
/// - [`Config`](RagError::Config) covers invalid chunking or client
///   configuration. Fatal, surfaced before any work is done.
/// - [`Remote`](RagError::Remote) covers every failure mode of the
///   remote composer's HTTP call (unreachable host, non-success status,
///   malformed body). The local composer has no failure mode.
///
/// Degenerate conditions — empty corpus, empty contexts, missing
/// metadata — are not errors and have defined outputs instead.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid configuration, e.g. chunk overlap not smaller than size.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The remote generation service could not produce an answer.
    #[error("remote generation failed: {0}")]
    Remote(String),
}

/// A cleaned document handed to [`DocumentStore::fit`](crate::index::DocumentStore::fit),
/// paired with its string metadata.
///
/// The core never reads files; callers load and clean text themselves
/// (see [`crate::text::normalize_whitespace`]) and attach whatever
/// metadata the presentation layer needs. The `"source"` key is the only
/// one the pipeline interprets.
///
/// # Examples
///
/// ```
/// use citesmith::Document;
///
/// let doc = Document::new("The fund targets 8% annual growth.")
///     .with_source("fund_overview.txt");
/// assert_eq!(doc.meta.get("source").map(String::as_str), Some("fund_overview.txt"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Cleaned document text.
    pub text: String,
    /// Caller-supplied metadata, copied onto every chunk of this document.
    pub meta: FxHashMap<String, String>,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: FxHashMap::default(),
        }
    }

    /// Set the `"source"` metadata key used for citations.
    #[must_use]
    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with_meta("source", source)
    }

    /// Attach an arbitrary metadata key/value pair.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// A retrieval hit enriched with its originating document identifier.
///
/// Created per query by the pipeline and consumed by composers and the
/// evaluation module. `source` defaults to `"unknown"` when the indexed
/// entry carries no `"source"` metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Cosine similarity of this chunk against the query, in `[0, 1]`.
    pub score: f64,
    /// Chunk text.
    pub text: String,
    /// Originating document identifier.
    pub source: String,
}

/// A pointer from an answer back to a source document and sentence.
///
/// `line` is the 1-based sentence index within the cited context for
/// the extractive composer, and fixed at 1 for remote composers that
/// cite whole sources.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Source document identifier.
    pub source: String,
    /// 1-based sentence position within the cited context.
    pub line: usize,
}

/// What a composer returns: the answer text plus its citations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposedAnswer {
    /// Final answer text, including any fixed header the composer adds.
    pub answer: String,
    /// Citations in the order the composer produced them.
    pub citations: Vec<Citation>,
}

/// The full result of one [`RagPipeline::answer`](crate::pipeline::RagPipeline::answer) call.
///
/// Ephemeral — one per call, nothing is cached between invocations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The query as asked.
    pub query: String,
    /// Composed answer text.
    pub answer: String,
    /// Citations backing the answer.
    pub citations: Vec<Citation>,
    /// The retrieval contexts the answer was composed from, best first.
    pub contexts: Vec<Context>,
}
