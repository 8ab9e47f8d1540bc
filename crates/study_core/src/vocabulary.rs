use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of vocabulary candidates offered per generated material.
pub const VOCABULARY_LIMIT: usize = 10;
/// Shortest letter run considered a candidate word.
pub const MIN_WORD_LEN: usize = 4;

static LETTER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{4,}").expect("letter-run pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VocabularyStatus {
    #[default]
    Unknown,
    Known,
    NotKnown,
}

impl VocabularyStatus {
    pub fn from_choice(known: bool) -> Self {
        if known {
            VocabularyStatus::Known
        } else {
            VocabularyStatus::NotKnown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyItem {
    pub word: String,
    pub status: VocabularyStatus,
}

/// Strategy that picks candidate words out of generated text, in reading order.
pub trait WordSource: Send + Sync {
    fn words(&self, text: &str) -> Vec<String>;
}

/// Maximal runs of at least four ASCII letters.
#[derive(Debug, Default, Clone, Copy)]
pub struct LetterRunWords;

impl WordSource for LetterRunWords {
    fn words(&self, text: &str) -> Vec<String> {
        LETTER_RUN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Extract vocabulary candidates with the default letter-run heuristic.
pub fn extract(text: &str) -> Vec<VocabularyItem> {
    extract_with(&LetterRunWords, text)
}

/// Lowercase, dedupe in first-seen order and cap the words a source yields.
pub fn extract_with(source: &dyn WordSource, text: &str) -> Vec<VocabularyItem> {
    let mut seen = HashSet::new();
    source
        .words(text)
        .into_iter()
        .map(|word| word.to_lowercase())
        .filter(|word| seen.insert(word.clone()))
        .take(VOCABULARY_LIMIT)
        .map(|word| VocabularyItem {
            word,
            status: VocabularyStatus::Unknown,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[VocabularyItem]) -> Vec<&str> {
        items.iter().map(|item| item.word.as_str()).collect()
    }

    #[test]
    fn short_words_are_skipped() {
        let items = extract("The cat sat on the mat and studied diligently");
        assert_eq!(words(&items), vec!["studied", "diligently"]);
        assert!(items
            .iter()
            .all(|item| item.status == VocabularyStatus::Unknown));
    }

    #[test]
    fn duplicates_fold_case_and_keep_first_position() {
        let items = extract("Photosynthesis converts light. PHOTOSYNTHESIS needs Light and water.");
        assert_eq!(
            words(&items),
            vec!["photosynthesis", "converts", "light", "needs", "water"]
        );
    }

    #[test]
    fn letter_runs_stop_at_digits_and_markup() {
        let items = extract("## Word2vec **bold** under_score café");
        assert_eq!(words(&items), vec!["word", "bold", "under", "score"]);
    }

    #[test]
    fn output_is_capped() {
        let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike";
        let items = extract(text);
        assert_eq!(items.len(), VOCABULARY_LIMIT);
        assert_eq!(items.last().map(|item| item.word.as_str()), Some("juliet"));
        assert_eq!(extract(text), items);
    }

    #[test]
    fn custom_sources_are_normalized_the_same_way() {
        struct Whitespace;
        impl WordSource for Whitespace {
            fn words(&self, text: &str) -> Vec<String> {
                text.split_whitespace().map(str::to_string).collect()
            }
        }

        let items = extract_with(&Whitespace, "Go go GO to");
        assert_eq!(words(&items), vec!["go", "to"]);
    }
}
