//! Post-hoc lexical-overlap metrics for composed answers.
//!
//! These metrics judge an answer purely against the source texts it was
//! composed from: how much of its vocabulary the sources support, and
//! which of its sentences fall below a support threshold. They share
//! the tokenizer and sentence splitter with the rest of the crate, so a
//! flagged sentence is exactly a sentence the composer could have
//! produced.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::text::{split_sentences, tokenize};

/// Overlap ratio below which a sentence counts as unsupported.
const SUPPORT_THRESHOLD: f64 = 0.35;

/// Combined evaluation of one answer against its sources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    /// Fraction of unique answer tokens present anywhere in the sources,
    /// in `[0, 1]`.
    pub support_coverage: f64,
    /// Number of flagged sentences.
    pub unsupported_sentence_count: usize,
    /// Sentences whose own overlap ratio fell below the threshold, in
    /// answer order.
    pub unsupported_sentences: Vec<String>,
}

/// Fraction of the answer's unique tokens that appear in any source.
///
/// An answer with no tokens has coverage 0 by convention.
pub fn support_coverage<S: AsRef<str>>(answer: &str, sources: &[S]) -> f64 {
    let answer_tokens = token_set(answer);
    if answer_tokens.is_empty() {
        return 0.0;
    }
    let source_tokens = union_tokens(sources);
    let supported = answer_tokens.intersection(&source_tokens).count();
    supported as f64 / answer_tokens.len() as f64
}

/// Sentences of the answer with low lexical overlap to the sources —
/// likely hallucinations.
///
/// Each sentence is scored on its own unique tokens; sentences with no
/// tokens are skipped rather than flagged. A ratio strictly below the
/// threshold (0.35) flags the sentence.
pub fn unsupported_sentences<S: AsRef<str>>(answer: &str, sources: &[S]) -> Vec<String> {
    let source_tokens = union_tokens(sources);
    split_sentences(answer.trim())
        .into_iter()
        .filter(|sentence| {
            let tokens = token_set(sentence);
            if tokens.is_empty() {
                return false;
            }
            let supported = tokens.intersection(&source_tokens).count();
            (supported as f64 / tokens.len() as f64) < SUPPORT_THRESHOLD
        })
        .collect()
}

/// Run both metrics and package the result.
pub fn evaluate_answer<S: AsRef<str>>(answer: &str, sources: &[S]) -> AnswerEvaluation {
    let coverage = support_coverage(answer, sources);
    let flagged = unsupported_sentences(answer, sources);
    AnswerEvaluation {
        support_coverage: coverage,
        unsupported_sentence_count: flagged.len(),
        unsupported_sentences: flagged,
    }
}

fn token_set(text: &str) -> FxHashSet<String> {
    tokenize(text).into_iter().collect()
}

fn union_tokens<S: AsRef<str>>(sources: &[S]) -> FxHashSet<String> {
    let mut tokens = FxHashSet::default();
    for source in sources {
        tokens.extend(tokenize(source.as_ref()));
    }
    tokens
}
