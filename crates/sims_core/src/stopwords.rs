use std::collections::HashSet;

/// Common English words dropped from headline keyword counts. Words of two
/// characters or fewer are discarded anyway, so they are not listed.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "amid", "and", "any", "are",
    "aren", "because", "been", "before", "being", "below", "between", "both", "but",
    "can", "could", "did", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "into", "its", "itself", "just", "more", "most",
    "new", "nor", "not", "now", "off", "once", "only", "other", "our", "ours",
    "ourselves", "out", "over", "own", "said", "same", "says", "she", "should", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "too", "under", "until", "very",
    "via", "was", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Lower-cased set of tokens excluded from keyword analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn english() -> Self {
        DEFAULT_STOPWORDS.iter().copied().collect()
    }

    pub fn insert(&mut self, word: &str) {
        self.0.insert(word.to_lowercase());
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut words = StopWords::empty();
        for word in iter {
            words.insert(word.as_ref());
        }
        words
    }
}
