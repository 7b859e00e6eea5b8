//! # Citesmith: deterministic retrieval with citation-grounded answers
//!
//! Citesmith retrieves relevant passages from a small in-memory corpus
//! and composes an answer that cites its sources — without any learned
//! embedding model. Retrieval is a sparse tf-idf index over overlapping
//! token chunks, ranked by cosine similarity; answering is either
//! deterministic sentence extraction or delegation to a remote
//! generation service behind the same trait.
//!
//! ```text
//! Documents ──► chunker::make_chunks ──► index::DocumentStore (fit)
//!                                              │
//! Query ──────────────────────────────► DocumentStore::query
//!                                              │
//!                               ranked (score, chunk) pairs
//!                                              │
//!                     pipeline::RagPipeline ──► Context assembly
//!                                              │
//!                 compose::AnswerComposer ─┬─► ExtractiveComposer
//!                                          └─► OllamaComposer (HTTP)
//!                                              │
//!                        AnswerResult {answer, citations, contexts}
//!                                              │
//!                          eval::evaluate_answer (support metrics)
//! ```
//!
//! ## Quick start
//!
//! ```
//! use citesmith::{Document, DocumentStore, ExtractiveComposer, RagPipeline};
//!
//! # fn main() -> Result<(), citesmith::RagError> {
//! let mut store = DocumentStore::new();
//! store.fit(&[
//!     Document::new("The fund targets 8% annual growth. Risks include inflation.")
//!         .with_source("fund_overview.txt"),
//! ])?;
//!
//! let pipeline = RagPipeline::new(store, ExtractiveComposer::default());
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let result = rt.block_on(pipeline.answer("What is the growth target?", 4))?;
//!
//! assert!(result.answer.contains("8% annual growth"));
//! assert_eq!(result.citations[0].source, "fund_overview.txt");
//! # Ok(())
//! # }
//! ```
//!
//! ## Scope
//!
//! The index is process-local and non-persistent; `fit` is a full
//! rebuild and is not safe to call concurrently with `query` on the
//! same store. The only network-dependent path is the remote composer,
//! which makes one best-effort request per answer — retry policy, if
//! any, belongs to the caller.

pub mod chunker;
pub mod compose;
pub mod eval;
pub mod index;
pub mod pipeline;
pub mod text;
pub mod types;

pub use chunker::{Chunk, ChunkingConfig, make_chunks};
pub use compose::{
    AnswerComposer, ExtractiveComposer, GenerateOptions, OllamaClient, OllamaComposer,
    OllamaConfig,
};
pub use eval::{AnswerEvaluation, evaluate_answer, support_coverage, unsupported_sentences};
pub use index::{DocumentStore, IndexedEntry};
pub use pipeline::RagPipeline;
pub use types::{AnswerResult, Citation, ComposedAnswer, Context, Document, RagError};
