//! Word frequency counting for open-text answers

use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Common English words carrying no topical meaning
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "because", "been", "before", "being",
    "below", "between", "both", "could", "does", "doing", "down", "during", "each", "even",
    "from", "further", "have", "having", "here", "hers", "herself", "himself", "into", "itself",
    "just", "like", "more", "most", "much", "must", "myself", "once", "only", "other", "ourselves",
    "over", "same", "should", "some", "such", "than", "that", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "under", "until",
    "very", "was", "were", "what", "when", "where", "which", "while", "will", "with", "would",
    "your", "yours", "yourself", "yourselves",
];

/// One word and how often it appeared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Lower-case alphabetic tokens longer than three characters, stopwords removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > 3)
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
        .collect()
}

/// Frequency table over every text, highest count first, ties alphabetical
pub fn word_frequencies<'a, I>(texts: I, limit: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in tokenize(text) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(limit);
    words
}
