//! Lexical utilities shared across the retrieval core.
//!
//! The index, both composers, and the evaluation metrics all tokenize
//! and split sentences through this module. Keeping one implementation
//! matters more than the quality of either heuristic: if the evaluator
//! split sentences differently from the composer, its metrics would
//! silently measure something the composer never produced.

use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid regex"));
static CONTROL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\r\x0C]+").expect("valid regex"));
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" *\n+ *").expect("valid regex"));

/// Split text into case-folded alphanumeric runs.
///
/// Every non-alphanumeric character is a separator and consecutive
/// separators collapse, so `"Growth-rate: 8%!"` yields
/// `["growth", "rate", "8"]`. This is the tokenizer the index uses for
/// term weights and the evaluator uses for overlap ratios.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split text into sentences with a crude boundary rule.
///
/// A boundary is a `.`, `?`, or `!` followed by whitespace and then an
/// uppercase letter or opening bracket. The rule is intentionally
/// imperfect — abbreviations followed by capitalized words split, and
/// sentences starting lowercase merge — but it is cheap, deterministic,
/// and shared by the composer and the evaluator.
///
/// Returned sentences are trimmed; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if matches!(chars[i], '.' | '?' | '!') {
            let mut next = i + 1;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            let crossed_whitespace = next > i + 1;
            if crossed_whitespace
                && next < chars.len()
                && (chars[next].is_uppercase() || chars[next] == '(' || chars[next] == '[')
            {
                push_trimmed(&mut sentences, &chars[start..next]);
                start = next;
                i = next;
                continue;
            }
        }
        i += 1;
    }

    push_trimmed(&mut sentences, &chars[start..]);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &[char]) {
    let sentence: String = piece.iter().collect();
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

/// Collapse messy whitespace in loader output.
///
/// Non-breaking spaces become plain spaces, tab/CR/FF runs become one
/// space, space runs collapse, and newline runs (with any surrounding
/// spaces) collapse to a single newline. Callers clean documents with
/// this before handing them to [`DocumentStore::fit`](crate::index::DocumentStore::fit).
pub fn normalize_whitespace(text: &str) -> String {
    let replaced = text.replace('\u{00A0}', " ");
    let replaced = CONTROL_RUNS.replace_all(&replaced, " ");
    let replaced = SPACE_RUNS.replace_all(&replaced, " ");
    let replaced = NEWLINE_RUNS.replace_all(&replaced, "\n");
    replaced.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_folds_case_and_collapses_separators() {
        assert_eq!(tokenize("Growth-rate: 8%!"), vec!["growth", "rate", "8"]);
        assert_eq!(tokenize("  --  "), Vec::<String>::new());
        assert_eq!(tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn tokenize_keeps_digits_with_letters() {
        assert_eq!(tokenize("Q3 revenue"), vec!["q3", "revenue"]);
    }

    #[test]
    fn sentences_split_on_terminator_before_uppercase() {
        let sentences =
            split_sentences("The fund targets 8% annual growth. Risks include inflation.");
        assert_eq!(
            sentences,
            vec![
                "The fund targets 8% annual growth.",
                "Risks include inflation."
            ]
        );
    }

    #[test]
    /// Lowercase continuation after a period does not split, which keeps
    /// common abbreviations intact.
    fn sentences_keep_lowercase_continuations() {
        let sentences = split_sentences("The approx. value held steady.");
        assert_eq!(sentences, vec!["The approx. value held steady."]);
    }

    #[test]
    fn sentences_split_before_brackets() {
        let sentences = split_sentences("Done. (See appendix.) More follows. [Note] here.");
        // The period inside "appendix.)" is not followed by whitespace,
        // so the parenthesized aside stays glued to the next sentence.
        assert_eq!(
            sentences,
            vec!["Done.", "(See appendix.) More follows.", "[Note] here."]
        );
    }

    #[test]
    fn sentences_require_whitespace_after_terminator() {
        // "8.5" must not split mid-number.
        let sentences = split_sentences("Growth of 8.5 percent was reported.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn sentences_drop_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n  ").is_empty());
    }

    #[test]
    fn normalize_collapses_spaces_tabs_and_newlines() {
        let cleaned = normalize_whitespace("a\u{00A0}b\t\tc   d \n\n  e");
        assert_eq!(cleaned, "a b c d\ne");
    }

    #[test]
    fn normalize_trims_edges() {
        assert_eq!(normalize_whitespace("  text  "), "text");
        assert_eq!(normalize_whitespace(""), "");
    }
}
