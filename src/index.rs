//! Sparse term-weighted index over chunked documents.
//!
//! [`DocumentStore`] is the document store at the heart of the crate:
//! [`fit`](DocumentStore::fit) chunks a corpus and builds one sparse
//! tf-idf vector per chunk, [`query`](DocumentStore::query) ranks every
//! chunk against a query by cosine similarity. Everything is in-memory
//! and process-local; a `fit` call discards all prior state.
//!
//! Ranking is a linear scan over all chunk vectors — O(corpus size ×
//! query vocabulary) per query, which is fine for the corpus sizes this
//! crate targets. An inverted index would be an optimization, not a
//! behavior change.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::chunker::{ChunkingConfig, make_chunks};
use crate::text::tokenize;
use crate::types::{Document, RagError};

/// Floor applied to vector norms so all-zero vectors score 0 instead of
/// dividing by zero.
const NORM_EPSILON: f64 = 1e-12;

/// One indexed chunk: its text and the metadata of the document it came
/// from.
///
/// Entries are owned by the store — created during
/// [`fit`](DocumentStore::fit), immutable afterward, and replaced
/// wholesale by the next `fit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexedEntry {
    /// Chunk text.
    pub text: String,
    /// Metadata of the originating document.
    pub meta: FxHashMap<String, String>,
}

/// In-memory sparse tf-idf index with cosine-similarity ranking.
///
/// # Weighting
///
/// Term weights use raw term frequency (`count / tokens_in_chunk`)
/// scaled by a smoothed inverse document frequency,
/// `ln((chunks + 1) / (df + 1)) + 1`, where document frequency counts
/// chunks containing the term. The build is two-phase: document
/// frequencies are accumulated over the *whole* corpus first, and chunk
/// vectors are only computed once the df table is complete, so every
/// weight reflects the finished corpus rather than a running count.
///
/// # Concurrency
///
/// `fit` takes `&mut self`, `query` takes `&self`; there is no internal
/// locking. Hold the store immutable after fitting to share it across
/// readers, and serialize any re-fit.
///
/// # Examples
///
/// ```
/// use citesmith::{Document, DocumentStore};
///
/// let mut store = DocumentStore::new();
/// store.fit(&[
///     Document::new("The fund targets 8% annual growth.").with_source("fund.txt"),
///     Document::new("Bond yields fell last quarter.").with_source("bonds.txt"),
/// ]).unwrap();
///
/// let hits = store.query("what growth does the fund target?", 1);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].1.meta["source"], "fund.txt");
/// ```
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    chunking: ChunkingConfig,
    entries: Vec<IndexedEntry>,
    vectors: Vec<FxHashMap<String, f64>>,
    doc_freq: FxHashMap<String, usize>,
}

impl DocumentStore {
    /// Create a store with the default chunking parameters (600/80).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with explicit chunking parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] when `overlap >= size` or `size == 0`.
    pub fn with_chunking(size: usize, overlap: usize) -> Result<Self, RagError> {
        Ok(Self {
            chunking: ChunkingConfig::new(size, overlap)?,
            ..Self::default()
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing has been fitted (or the corpus chunked to
    /// nothing).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild the index from a corpus, replacing all prior state.
    ///
    /// Pass one chunks each document and accumulates per-term document
    /// frequencies over each chunk's unique term set; pass two computes
    /// the tf-idf vector of every chunk against the completed table.
    ///
    /// # Errors
    ///
    /// Only the chunking configuration can fail here; an empty corpus is
    /// valid and produces an empty index.
    pub fn fit(&mut self, documents: &[Document]) -> Result<(), RagError> {
        self.entries.clear();
        self.vectors.clear();
        self.doc_freq.clear();

        let mut chunk_tokens: Vec<Vec<String>> = Vec::new();
        for document in documents {
            let chunks = make_chunks(&document.text, self.chunking.size, self.chunking.overlap)?;
            for chunk in chunks {
                let tokens = tokenize(&chunk.text);
                let unique: FxHashSet<&str> = tokens.iter().map(String::as_str).collect();
                for term in unique {
                    *self.doc_freq.entry(term.to_string()).or_insert(0) += 1;
                }
                self.entries.push(IndexedEntry {
                    text: chunk.text,
                    meta: document.meta.clone(),
                });
                chunk_tokens.push(tokens);
            }
        }

        // Weights are only valid once the df table covers the whole corpus.
        self.vectors = chunk_tokens
            .iter()
            .map(|tokens| self.weight_vector(tokens))
            .collect();

        tracing::debug!(
            documents = documents.len(),
            chunks = self.entries.len(),
            vocabulary = self.doc_freq.len(),
            "fitted corpus"
        );
        Ok(())
    }

    /// Rank all indexed chunks against `text` and return the best
    /// `top_k` as `(score, entry)` pairs, descending by cosine
    /// similarity, ties broken by indexing order.
    ///
    /// An empty index, an empty query vocabulary, or `top_k == 0` all
    /// yield an empty result. `top_k` beyond the corpus size returns
    /// every entry.
    pub fn query(&self, text: &str, top_k: usize) -> Vec<(f64, IndexedEntry)> {
        let query_vector = self.weight_vector(&tokenize(text));

        let mut ranked: Vec<(f64, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| (cosine_similarity(&query_vector, vector), index))
            .collect();
        // Stable sort keeps indexing order among equal scores.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.truncate(top_k);

        tracing::debug!(
            top_k,
            candidates = self.entries.len(),
            returned = ranked.len(),
            "ranked corpus"
        );

        ranked
            .into_iter()
            .map(|(score, index)| (score, self.entries[index].clone()))
            .collect()
    }

    /// Sparse tf-idf vector for a token sequence, weighted against the
    /// current corpus statistics. Only occurring terms get entries, so
    /// the sparsity invariant (no stored zeros) holds by construction.
    fn weight_vector(&self, tokens: &[String]) -> FxHashMap<String, f64> {
        let total = tokens.len().max(1) as f64;
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(term, count)| {
                let tf = count as f64 / total;
                (term.to_string(), tf * self.idf(term))
            })
            .collect()
    }

    /// Smoothed inverse document frequency: `ln((n + 1) / (df + 1)) + 1`.
    ///
    /// Unseen terms get `df = 0`, so a query can always be weighted even
    /// when its vocabulary is disjoint from the corpus.
    fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        let chunks = self.entries.len() as f64;
        ((chunks + 1.0) / (df + 1.0)).ln() + 1.0
    }
}

/// Cosine similarity between two sparse non-negative vectors, in
/// `[0, 1]`. Either side empty scores 0.
fn cosine_similarity(a: &FxHashMap<String, f64>, b: &FxHashMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, x)| large.get(term).map(|y| x * y))
        .sum();
    let norm_a = norm(a);
    let norm_b = norm(b);
    dot / (norm_a * norm_b)
}

fn norm(vector: &FxHashMap<String, f64>) -> f64 {
    vector
        .values()
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt()
        .max(NORM_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f64)]) -> FxHashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn fund_corpus() -> Vec<Document> {
        vec![
            Document::new("The fund targets 8% annual growth. Risks include inflation.")
                .with_source("fund.txt"),
            Document::new("Bond yields declined sharply over the last quarter.")
                .with_source("bonds.txt"),
        ]
    }

    #[test]
    fn fit_builds_one_chunk_per_short_document() {
        let mut store = DocumentStore::with_chunking(600, 80).unwrap();
        store.fit(&fund_corpus()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn query_ranks_matching_document_first() {
        let mut store = DocumentStore::new();
        store.fit(&fund_corpus()).unwrap();

        let hits = store.query("What is the growth target?", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].1.meta["source"], "fund.txt");
        assert!(hits[0].0 > hits[1].0);
    }

    #[test]
    fn self_query_normalizes_to_one() {
        let text = "The fund targets 8% annual growth. Risks include inflation.";
        let mut store = DocumentStore::new();
        store
            .fit(&[Document::new(text).with_source("fund.txt")])
            .unwrap();

        let hits = store.query(text, 1);
        assert_eq!(hits[0].1.text, text);
        assert!(hits[0].0 > 0.999, "self similarity was {}", hits[0].0);
    }

    #[test]
    fn empty_corpus_queries_return_nothing() {
        let mut store = DocumentStore::new();
        store.fit(&[]).unwrap();
        assert!(store.is_empty());
        assert!(store.query("anything at all", 5).is_empty());
    }

    #[test]
    fn top_k_bounds_are_respected() {
        let mut store = DocumentStore::new();
        store.fit(&fund_corpus()).unwrap();

        assert!(store.query("growth", 0).is_empty());
        assert_eq!(store.query("growth", 1).len(), 1);
        // More than the corpus holds returns everything once.
        assert_eq!(store.query("growth", 50).len(), 2);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut store = DocumentStore::new();
        store.fit(&fund_corpus()).unwrap();

        let first = store.query("inflation risks", 2);
        let second = store.query("inflation risks", 2);
        assert_eq!(first, second);
    }

    #[test]
    fn refit_discards_previous_corpus() {
        let mut store = DocumentStore::new();
        store.fit(&fund_corpus()).unwrap();
        store
            .fit(&[Document::new("Fresh corpus only.").with_source("fresh.txt")])
            .unwrap();

        assert_eq!(store.len(), 1);
        let hits = store.query("fresh corpus", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.meta["source"], "fresh.txt");
    }

    #[test]
    fn disjoint_query_scores_zero_but_still_returns() {
        let mut store = DocumentStore::new();
        store.fit(&fund_corpus()).unwrap();

        let hits = store.query("zebra xylophone", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 0.0);
        // Zero-score ties keep indexing order.
        assert_eq!(hits[0].1.meta["source"], "fund.txt");
        assert_eq!(hits[1].1.meta["source"], "bonds.txt");
    }

    #[test]
    fn invalid_chunking_is_rejected_up_front() {
        assert!(matches!(
            DocumentStore::with_chunking(80, 80),
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn long_documents_chunk_with_overlap() {
        let words: Vec<String> = (0..1500).map(|i| format!("w{i}")).collect();
        let mut store = DocumentStore::with_chunking(600, 80).unwrap();
        store
            .fit(&[Document::new(words.join(" ")).with_source("long.txt")])
            .unwrap();
        // 0..600, 520..1120, 1040..1500
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn cosine_is_symmetric_and_bounded() {
        let a = vector(&[("growth", 0.8), ("fund", 0.3)]);
        let b = vector(&[("growth", 0.5), ("risk", 0.4)]);

        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert_eq!(ab, ba);
        assert!((0.0..=1.0).contains(&ab));
        assert!(cosine_similarity(&a, &a) > 0.999_999);
    }

    #[test]
    fn cosine_of_empty_or_disjoint_vectors_is_zero() {
        let a = vector(&[("growth", 0.8)]);
        let empty = FxHashMap::default();
        let disjoint = vector(&[("bond", 1.0)]);

        assert_eq!(cosine_similarity(&a, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
        assert_eq!(cosine_similarity(&a, &disjoint), 0.0);
    }

    #[test]
    fn idf_prefers_rare_terms() {
        let mut store = DocumentStore::new();
        store
            .fit(&[
                Document::new("common word alpha").with_source("a"),
                Document::new("common word beta").with_source("b"),
            ])
            .unwrap();

        // "common" appears in both chunks, "alpha" in one.
        assert!(store.idf("alpha") > store.idf("common"));
        // Unseen terms still get a finite positive weight.
        assert!(store.idf("unseen") > store.idf("alpha"));
    }
}
