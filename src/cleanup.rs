use std::collections::BTreeSet;
use tracing::debug;

use crate::config::FilterConfig;
use crate::error::Result;
use crate::lemma::Lemmatizer;

/// Characters stripped from the start of a word
const LEADING_NOISE: &[char] = &[' ', ';', '´', '–', '-', '\'', '‘', '&'];

/// Characters stripped from both ends of a word
const EDGE_NOISE: &[char] = &[
    ' ', '…', ':', '•', '–', '=', '"', '#', '$', '@', '*', '<', '>', '%', '“', '”', '’', ',',
    '.', '!', '/', '^', '?', ';', '(', ')', '[', ']', '{', '}', '£', '₤', '€', '♪', '♫',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Turns raw subtitle tokens into a sorted set of lemmas
pub struct WordCleaner {
    config: FilterConfig,
    lemmatizer: Box<dyn Lemmatizer>,
}

impl WordCleaner {
    pub fn new(config: FilterConfig, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        Self { config, lemmatizer }
    }

    /// Normalize, drop markup-looking words and trim punctuation, without lemmatizing
    pub fn filter<I>(&self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        words
            .into_iter()
            .filter_map(|word| self.filter_word(&word))
            .collect()
    }

    /// Full cleanup: filter, re-tokenize, lemmatize, deduplicate and sort
    pub async fn clean<I>(&self, words: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = String>,
    {
        let filtered = self.filter(words);

        // Replacements above can leave spaces inside a word
        let tokens: Vec<String> = filtered
            .iter()
            .flat_map(|word| word.split_whitespace())
            .map(str::to_string)
            .collect();

        // Lemmas go through the filter again so a cleaned list cleans to itself
        let lemmas = self.lemmatizer.lemmatize(&tokens).await?;
        let unique: BTreeSet<String> = self.filter(lemmas).into_iter().collect();

        debug!("{} tokens -> {} unique lemmas", tokens.len(), unique.len());
        Ok(unique.into_iter().collect())
    }

    fn filter_word(&self, word: &str) -> Option<String> {
        let mut word = word
            .replace('’', "'")
            .replace('—', "-")
            .replace("&nbsp", " ")
            .replace(':', " ");

        for fragment in self.config.fragments.iter().filter(|f| !f.is_empty()) {
            word = word.replace(fragment.as_str(), "");
        }

        if word.chars().count() < self.config.min_word_length {
            return None;
        }
        if word.matches('-').count() > self.config.max_dashes {
            return None;
        }
        if word.matches('.').count() > self.config.max_dots {
            return None;
        }
        if word.chars().any(|c| c as u32 > self.config.max_codepoint) {
            return None;
        }

        let mut trimmed = word.as_str();
        loop {
            let next = trim_noise(trimmed);
            if next.len() == trimmed.len() {
                break;
            }
            trimmed = next;
        }

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn trim_noise(word: &str) -> &str {
    word.trim_start_matches(LEADING_NOISE)
        .trim_start_matches('-')
        .trim_end_matches('-')
        .trim_end_matches('\'')
        .trim_matches(EDGE_NOISE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lemma::RuleLemmatizer;

    fn cleaner() -> WordCleaner {
        WordCleaner::new(FilterConfig::default(), Box::new(RuleLemmatizer::new()))
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_drops_short_words() {
        let filtered = cleaner().filter(words(&["a", "an", "the", "it."]));
        assert_eq!(filtered, vec!["the", "it"]);
    }

    #[test]
    fn test_removes_fragments_and_markup() {
        let filtered = cleaner().filter(words(&[
            "john's",
            "we'll",
            "&lt;b&gt;",
            "self-made",
            "color=\"#ffffff\"",
            "www.example.com",
        ]));
        assert_eq!(filtered, vec!["john", "b", "made", "ffffff", "example"]);
    }

    #[test]
    fn test_drops_words_with_many_dashes_or_dots() {
        let filtered = cleaner().filter(words(&["mother-in-law", "e.g.", "u.s", "well-known"]));
        assert_eq!(filtered, vec!["u.s", "well-known"]);
    }

    #[test]
    fn test_drops_non_latin_words() {
        let filtered = cleaner().filter(words(&["привет", "hello", "“quoted”", "naïve"]));
        assert_eq!(filtered, vec!["hello", "naïve"]);
    }

    #[test]
    fn test_trims_punctuation_and_digits() {
        let filtered = cleaner().filter(words(&[
            "(hello),",
            "'quoted'",
            "--dash-",
            "singing!!",
            "00:00:01,000",
            "-->",
            "¿what?",
        ]));
        assert_eq!(filtered, vec!["hello", "quoted", "dash", "singing", "¿what"]);
    }

    #[test]
    fn test_typographic_apostrophe_is_normalized() {
        let filtered = cleaner().filter(words(&["that’s", "don’t"]));
        assert_eq!(filtered, vec!["that", "don't"]);
    }

    #[tokio::test]
    async fn test_clean_lemmatizes_and_deduplicates() {
        let cleaned = cleaner()
            .clean(words(&["ducks", "duck", "changed", "don't", "running,", "runs"]))
            .await
            .unwrap();
        assert_eq!(cleaned, vec!["change", "duck", "not", "run"]);
    }

    #[test]
    fn test_trailing_apostrophe_behind_punctuation() {
        let filtered = cleaner().filter(words(&["rock'.", "singin'!"]));
        assert_eq!(filtered, vec!["rock", "singin"]);
    }

    #[tokio::test]
    async fn test_cleaning_twice_changes_nothing() {
        let cleaner = cleaner();
        let raw = words(&[
            "Buildings", "feelings,", "meetings", "beginnings", "greetings!", "travellers",
            "&lt;b&gt;", "goes", "i'm", "don't", "studies", "wolves", "rock'.",
            "ice-creams", "dressed", "self-made", "changed", "running...",
        ]);

        let once = cleaner.clean(raw).await.unwrap();
        let twice = cleaner.clean(once.clone()).await.unwrap();
        assert_eq!(twice, once);
        assert!(once.contains(&"building".to_string()));
        assert!(!once.contains(&"b".to_string()));
        assert!(!once.contains(&"go".to_string()));
    }

    #[tokio::test]
    async fn test_clean_splits_on_colons() {
        let cleaned = cleaner().clean(words(&["note:remember"])).await.unwrap();
        assert_eq!(cleaned, vec!["note", "remember"]);
    }

    #[tokio::test]
    async fn test_clean_of_nothing_is_empty() {
        let cleaned = cleaner().clean(Vec::new()).await.unwrap();
        assert!(cleaned.is_empty());
    }
}
