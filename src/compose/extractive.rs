//! Deterministic extractive answer composition.
//!
//! Quotes the most query-relevant sentences from the retrieved contexts
//! verbatim instead of generating text, which keeps the answer fully
//! attributable: every picked sentence carries a `(source, line)`
//! citation back to the context it came from.

use async_trait::async_trait;
use rustc_hash::FxHashSet;

use crate::compose::AnswerComposer;
use crate::text::split_sentences;
use crate::types::{Citation, ComposedAnswer, Context, RagError};

/// Header prefixed to every composed answer.
const ANSWER_HEADER: &str = "Answer (grounded in retrieved sources):\n";
/// Body used when the contexts hold nothing quotable.
const NO_ANSWER: &str = "No directly supported answer was found in the provided documents.";
/// Tie-breaker weight favoring longer sentences among equal overlaps.
const LENGTH_EPSILON: f64 = 1e-6;
/// Number of sentences quoted in the answer.
const MAX_PICKS: usize = 4;

/// Sentence-extraction composer with no external dependencies.
///
/// Scoring is lexical: a sentence earns one point per query term it
/// shares (case-folded whitespace words longer than 2 characters, no
/// stemming) plus a tiny per-term epsilon so longer sentences win ties.
/// The top four sentences across all contexts, in score order rather
/// than document order, become the answer body.
///
/// # Examples
///
/// ```
/// use citesmith::{Context, ExtractiveComposer};
/// use citesmith::compose::AnswerComposer;
///
/// let contexts = vec![Context {
///     score: 0.9,
///     text: "The fund targets 8% annual growth. Risks include inflation.".to_string(),
///     source: "fund.txt".to_string(),
/// }];
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let composed = rt
///     .block_on(ExtractiveComposer::default().compose("What is the growth target?", &contexts))
///     .unwrap();
/// assert!(composed.answer.contains("8% annual growth"));
/// assert_eq!(composed.citations[0].line, 1);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractiveComposer;

#[async_trait]
impl AnswerComposer for ExtractiveComposer {
    async fn compose(
        &self,
        query: &str,
        contexts: &[Context],
    ) -> Result<ComposedAnswer, RagError> {
        let query_terms = content_terms(query);

        let mut scored: Vec<ScoredSentence> = Vec::new();
        for context in contexts {
            for (index, sentence) in split_sentences(&context.text).into_iter().enumerate() {
                let terms = content_terms(&sentence);
                let overlap = terms.intersection(&query_terms).count();
                let score = overlap as f64 + LENGTH_EPSILON * terms.len() as f64;
                if score > 0.0 {
                    scored.push(ScoredSentence {
                        score,
                        sentence,
                        source: context.source.clone(),
                        line: index + 1,
                    });
                }
            }
        }

        // Stable sort: equal scores keep context order, then sentence order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(MAX_PICKS);

        if scored.is_empty()
            && let Some(first_context) = contexts.first()
            && let Some(first_sentence) = split_sentences(&first_context.text).into_iter().next()
        {
            // Degenerate pick: nothing overlapped the query, quote the top
            // context's opening sentence rather than answering from nothing.
            scored.push(ScoredSentence {
                score: 0.0,
                sentence: first_sentence,
                source: first_context.source.clone(),
                line: 1,
            });
        }

        let citations: Vec<Citation> = scored
            .iter()
            .map(|pick| Citation {
                source: pick.source.clone(),
                line: pick.line,
            })
            .collect();

        let body = if scored.is_empty() {
            NO_ANSWER.to_string()
        } else {
            scored
                .into_iter()
                .map(|pick| pick.sentence)
                .collect::<Vec<_>>()
                .join(" ")
        };

        tracing::debug!(
            contexts = contexts.len(),
            citations = citations.len(),
            "composed extractive answer"
        );

        Ok(ComposedAnswer {
            answer: format!("{ANSWER_HEADER}{body}"),
            citations,
        })
    }
}

struct ScoredSentence {
    score: f64,
    sentence: String,
    source: String,
    line: usize,
}

/// Case-folded whitespace words longer than 2 characters. Punctuation
/// stays attached, so this is coarser than the index tokenizer on
/// purpose — both sides of the overlap use the same rule.
fn content_terms(text: &str) -> FxHashSet<String> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(text: &str, source: &str) -> Context {
        Context {
            score: 0.5,
            text: text.to_string(),
            source: source.to_string(),
        }
    }

    async fn compose(query: &str, contexts: &[Context]) -> ComposedAnswer {
        ExtractiveComposer
            .compose(query, contexts)
            .await
            .expect("extractive composition cannot fail")
    }

    #[tokio::test]
    async fn quotes_the_matching_sentence_with_its_line() {
        let contexts = vec![context(
            "The fund targets 8% annual growth. Risks include inflation.",
            "fund.txt",
        )];
        let composed = compose("What is the growth target?", &contexts).await;

        assert!(composed.answer.starts_with(ANSWER_HEADER));
        assert!(composed.answer.contains("8% annual growth"));
        assert_eq!(
            composed.citations[0],
            Citation {
                source: "fund.txt".to_string(),
                line: 1
            }
        );
    }

    #[tokio::test]
    async fn ranks_by_overlap_not_document_order() {
        let contexts = vec![context(
            "Inflation stayed low. The fund targets strong annual growth targets. Nothing else here.",
            "fund.txt",
        )];
        let composed = compose("annual growth targets", &contexts).await;

        // The second sentence overlaps most and must lead the answer body.
        let body = composed.answer.trim_start_matches(ANSWER_HEADER);
        assert!(body.starts_with("The fund targets strong annual growth targets."));
        assert_eq!(composed.citations[0].line, 2);
    }

    #[tokio::test]
    async fn caps_picks_at_four() {
        let text = "Growth is strong here. Growth continued rising fast. \
                    Growth targets were met. Growth exceeded the plan. \
                    Growth may slow later.";
        let composed = compose("growth", &[context(text, "fund.txt")]).await;
        assert_eq!(composed.citations.len(), 4);
    }

    #[tokio::test]
    async fn duplicate_citations_are_allowed() {
        let contexts = vec![
            context("Growth was strong overall.", "fund.txt"),
            context("Growth was strong overall.", "fund.txt"),
        ];
        let composed = compose("growth", &contexts).await;
        assert_eq!(composed.citations.len(), 2);
        assert_eq!(composed.citations[0], composed.citations[1]);
    }

    #[tokio::test]
    async fn falls_back_to_first_sentence_on_no_scoring_sentence() {
        // Every word is <= 2 chars, so no sentence scores above zero.
        let contexts = vec![context("a b c d", "tiny.txt"), context("e f g", "other.txt")];
        let composed = compose("unrelated query words", &contexts).await;

        assert_eq!(composed.answer, format!("{ANSWER_HEADER}a b c d"));
        assert_eq!(
            composed.citations,
            vec![Citation {
                source: "tiny.txt".to_string(),
                line: 1
            }]
        );
    }

    #[tokio::test]
    async fn empty_contexts_yield_the_no_answer_literal() {
        let composed = compose("anything", &[]).await;
        assert_eq!(composed.answer, format!("{ANSWER_HEADER}{NO_ANSWER}"));
        assert!(composed.citations.is_empty());
    }

    #[tokio::test]
    async fn context_with_no_sentences_also_yields_no_answer() {
        let composed = compose("anything", &[context("   ", "blank.txt")]).await;
        assert_eq!(composed.answer, format!("{ANSWER_HEADER}{NO_ANSWER}"));
        assert!(composed.citations.is_empty());
    }

    #[tokio::test]
    async fn epsilon_keeps_nonmatching_sentences_eligible() {
        // Zero query overlap but real words: the epsilon term keeps the
        // sentence in the ranking, so it is quoted rather than dropped.
        let contexts = vec![context("Bond yields declined sharply.", "bonds.txt")];
        let composed = compose("completely unrelated topic", &contexts).await;
        assert!(composed.answer.contains("Bond yields declined sharply."));
    }

    #[test]
    fn content_terms_filter_short_words_and_fold_case() {
        let terms = content_terms("The Fund IS up 8% NOW");
        assert!(terms.contains("the"));
        assert!(terms.contains("fund"));
        assert!(terms.contains("now"));
        assert!(!terms.contains("is"));
        assert!(!terms.contains("8%"));
    }
}
