//! Word tokenization, word-cloud ranking and title keyword extraction.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{NormalizedMessage, WordCloudTerm, UNTITLED};

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9']+").expect("word pattern compiles"));

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("punctuation pattern compiles"));

/// Function words and chat noise excluded from the word cloud.
const WORD_CLOUD_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "for", "nor", "with", "that", "this", "from", "your",
    "yours", "you", "are", "have", "will", "would", "could", "should", "we", "they", "them",
    "their", "our", "ours", "was", "were", "been", "into", "than", "then", "over", "under",
    "about", "like", "just", "make", "need", "want", "help", "what", "when", "where", "why",
    "how", "can", "please", "thanks", "thank", "chat", "gpt", "chatgpt", "assistant", "user",
    "system", "tool", "code", "also", "really", "maybe", "well", "even", "still", "back", "said",
    "more", "less", "using", "use", "used", "new", "know", "look", "point", "time",
];

/// Smaller list applied to conversation titles.
const TOPIC_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during", "help", "how", "what", "where", "when",
    "why", "can", "could", "would", "should", "will", "make", "need", "want", "get", "create",
    "write",
];

/// Titles that carry no topic signal.
const PLACEHOLDER_TITLES: &[&str] = &[UNTITLED, "New chat"];

static WORD_CLOUD_STOP_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| WORD_CLOUD_STOP_WORDS.iter().copied().collect());

static TOPIC_STOP_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| TOPIC_STOP_WORDS.iter().copied().collect());

/// Word-like tokens (ASCII letters, digits, apostrophes) of the lower-cased text.
pub fn tokens(lowered: &str) -> impl Iterator<Item = &str> {
    WORD_RE.find_iter(lowered).map(|found| found.as_str())
}

pub fn count_words(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    tokens(&text.to_lowercase()).count()
}

/// Length of `text` in UTF-16 code units, so an emoji outside the BMP counts twice.
pub fn count_chars(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Rank the words across all messages, highest weight first.
///
/// Ties keep the order in which words were first encountered.
pub fn word_cloud_terms(messages: &[NormalizedMessage], limit: usize) -> Vec<WordCloudTerm> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();

    for message in messages {
        if message.text.is_empty() {
            continue;
        }
        let lowered = message.text.to_lowercase();
        for raw in tokens(&lowered) {
            let word = raw.trim_end_matches('\'');
            if word.len() < 3 || WORD_CLOUD_STOP_SET.contains(word) {
                continue;
            }
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
        .into_iter()
        .map(|(text, weight)| WordCloudTerm { text, weight })
        .collect()
}

pub fn is_placeholder_title(title: &str) -> bool {
    title.is_empty() || PLACEHOLDER_TITLES.contains(&title)
}

/// Candidate topic keywords of one conversation title, in title order.
pub fn title_keywords(title: &str) -> Vec<String> {
    if is_placeholder_title(title) {
        return Vec::new();
    }
    let lowered = title.to_lowercase();
    let cleaned = NON_WORD_RE.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|word| word.len() > 3 && !TOPIC_STOP_SET.contains(word))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn message(text: &str) -> NormalizedMessage {
        NormalizedMessage {
            conversation_index: 0,
            conversation_id: "c".to_string(),
            conversation_title: "t".to_string(),
            role: Role::User,
            model: None,
            tool_name: None,
            create_time: None,
            content_type: "text".to_string(),
            has_code: false,
            is_multimodal: false,
            text: text.to_string(),
            word_count: count_words(text),
            char_count: count_chars(text),
        }
    }

    #[test]
    fn char_length_counts_utf16_units() {
        assert_eq!(count_chars("hello"), 5);
        assert_eq!(count_chars("héllo"), 5);
        assert_eq!(count_chars("hi 😀"), 5);
        assert_eq!(count_chars(""), 0);
    }

    #[test]
    fn apostrophes_stay_inside_words() {
        assert_eq!(count_words("Don't panic, it's FINE"), 4);
        assert_eq!(count_words("hello there"), 2);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("--- !!!"), 0);
    }

    #[test]
    fn non_ascii_letters_split_words() {
        assert_eq!(count_words("naïve idea"), 3);
    }

    #[test]
    fn word_cloud_filters_and_ranks() {
        let messages = vec![
            message("Rust rust RUST borrow checker"),
            message("The borrow checker's rules"),
            message("ok go"),
        ];
        let terms = word_cloud_terms(&messages, 120);
        assert_eq!(
            terms,
            vec![
                WordCloudTerm { text: "rust".into(), weight: 3 },
                WordCloudTerm { text: "borrow".into(), weight: 2 },
                WordCloudTerm { text: "checker".into(), weight: 1 },
                WordCloudTerm { text: "checker's".into(), weight: 1 },
                WordCloudTerm { text: "rules".into(), weight: 1 },
            ]
        );
    }

    #[test]
    fn trailing_apostrophes_are_stripped() {
        let terms = word_cloud_terms(&[message("students' students")], 10);
        assert_eq!(terms, vec![WordCloudTerm { text: "students".into(), weight: 2 }]);
    }

    #[test]
    fn word_cloud_is_capped_and_monotonic() {
        let text = (0..200)
            .map(|i| format!("word{i} ").repeat(i % 7 + 1))
            .collect::<String>();
        let terms = word_cloud_terms(&[message(&text)], 120);
        assert_eq!(terms.len(), 120);
        assert!(terms.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
    }

    #[test]
    fn empty_input_gives_empty_cloud() {
        assert!(word_cloud_terms(&[], 120).is_empty());
    }

    #[test]
    fn title_keywords_drop_short_and_stop_words() {
        assert_eq!(
            title_keywords("How to write a Python script: CSV-parsing"),
            vec!["python", "script", "parsing"]
        );
        assert!(title_keywords("New chat").is_empty());
        assert!(title_keywords(UNTITLED).is_empty());
    }
}
