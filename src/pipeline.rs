//! Query orchestration: index lookup, context assembly, composition.

use tracing::instrument;

use crate::compose::AnswerComposer;
use crate::index::DocumentStore;
use crate::types::{AnswerResult, Context, RagError};

/// Metadata key carrying the document identifier used in citations.
const SOURCE_KEY: &str = "source";
/// Source label for entries whose metadata lacks a `"source"` key.
const UNKNOWN_SOURCE: &str = "unknown";

/// Retrieval pipeline tying a fitted [`DocumentStore`] to a composer.
///
/// Every [`answer`](Self::answer) call re-queries the index, maps the
/// hits to [`Context`]s, and delegates composition — no caching and no
/// retries. The composer is the only substitution point; see
/// [`AnswerComposer`].
///
/// # Examples
///
/// ```
/// use citesmith::{Document, DocumentStore, ExtractiveComposer, RagPipeline};
///
/// # fn main() -> Result<(), citesmith::RagError> {
/// let mut store = DocumentStore::new();
/// store.fit(&[
///     Document::new("The fund targets 8% annual growth. Risks include inflation.")
///         .with_source("fund.txt"),
/// ])?;
///
/// let pipeline = RagPipeline::new(store, ExtractiveComposer::default());
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let result = rt.block_on(pipeline.answer("What is the growth target?", 4))?;
///
/// assert!(result.answer.contains("8% annual growth"));
/// assert_eq!(result.citations[0].source, "fund.txt");
/// # Ok(())
/// # }
/// ```
pub struct RagPipeline<C> {
    store: DocumentStore,
    composer: C,
}

impl<C: AnswerComposer> RagPipeline<C> {
    /// Wrap a fitted store and a composer.
    pub fn new(store: DocumentStore, composer: C) -> Self {
        Self { store, composer }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Mutable access for re-fitting. The caller is responsible for not
    /// re-fitting while queries are in flight; the store has no
    /// internal locking.
    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    /// Answer a query from the fitted corpus.
    ///
    /// Retrieves the `top_k` best chunks, assembles contexts (falling
    /// back to `"unknown"` when an entry has no source metadata), and
    /// hands them to the composer. The composed answer and citations
    /// are merged with the contexts into one [`AnswerResult`].
    ///
    /// # Errors
    ///
    /// Only a remote composer can fail; [`RagError::Remote`] propagates
    /// unchanged. The extractive composer never errors.
    #[instrument(skip(self), err)]
    pub async fn answer(&self, query: &str, top_k: usize) -> Result<AnswerResult, RagError> {
        let contexts: Vec<Context> = self
            .store
            .query(query, top_k)
            .into_iter()
            .map(|(score, entry)| Context {
                score,
                source: entry
                    .meta
                    .get(SOURCE_KEY)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
                text: entry.text,
            })
            .collect();

        let composed = self.composer.compose(query, &contexts).await?;

        Ok(AnswerResult {
            query: query.to_string(),
            answer: composed.answer,
            citations: composed.citations,
            contexts,
        })
    }
}
