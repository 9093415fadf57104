use std::fmt;

/// Whole-word, case-insensitive phrase matcher.
///
/// Both the phrase and the searched text go through [`tokenize`], so
/// `"Election-Results"` and `"election results"` are the same phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTrigger {
    words: Vec<String>,
}

impl PhraseTrigger {
    pub fn new(phrase: &str) -> Self {
        Self {
            words: tokenize(phrase),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// True iff the phrase words occur as a contiguous, ordered run of
    /// tokens in `text`.
    ///
    /// A phrase with no words is a subsequence of every token list and
    /// therefore matches any text, including empty text.
    pub fn matches(&self, text: &str) -> bool {
        if self.words.is_empty() {
            return true;
        }

        let tokens = tokenize(text);
        tokens
            .windows(self.words.len())
            .any(|window| window == self.words.as_slice())
    }
}

impl fmt::Display for PhraseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.words.join(" "))
    }
}

/// Lowercase `text`, turn ASCII punctuation into whitespace and split.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().map(String::from).collect()
}
