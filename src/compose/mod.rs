//! Answer composition over retrieved contexts.
//!
//! A composer turns `(query, ranked contexts)` into an answer string
//! plus citations. Two implementations exist behind one trait:
//!
//! - [`ExtractiveComposer`] — deterministic sentence extraction, pure
//!   computation, no failure mode.
//! - [`OllamaComposer`] — delegates to a text-generation HTTP service;
//!   any network or protocol failure surfaces as
//!   [`RagError::Remote`](crate::types::RagError::Remote).
//!
//! The trait is the substitution seam: anything implementing
//! [`AnswerComposer`] can drive a
//! [`RagPipeline`](crate::pipeline::RagPipeline).

pub mod extractive;
pub mod ollama;

use async_trait::async_trait;

use crate::types::{ComposedAnswer, Context, RagError};

pub use extractive::ExtractiveComposer;
pub use ollama::{GenerateOptions, OllamaClient, OllamaComposer, OllamaConfig};

/// Turns ranked retrieval contexts into a cited answer.
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    /// Compose an answer to `query` grounded in `contexts`.
    ///
    /// Implementations must not consult anything beyond the provided
    /// contexts; the citations they return point back into them.
    async fn compose(
        &self,
        query: &str,
        contexts: &[Context],
    ) -> Result<ComposedAnswer, RagError>;
}

#[async_trait]
impl<C: AnswerComposer + ?Sized> AnswerComposer for Box<C> {
    async fn compose(
        &self,
        query: &str,
        contexts: &[Context],
    ) -> Result<ComposedAnswer, RagError> {
        (**self).compose(query, contexts).await
    }
}
