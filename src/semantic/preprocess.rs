//! Text normalization for embedding input.
//!
//! Turns scraped text into the canonical form fed to the embedding model:
//! 1. Reject missing or whitespace-only input
//! 2. Lowercase
//! 3. Split into word tokens (runs of letters, numbers and `_`)
//! 4. Drop stop words
//! 5. Join with single spaces
//!
//! Anything that ends up empty becomes [`EMPTY_TEXT`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder substituted for text that normalizes to nothing.
pub const EMPTY_TEXT: &str = "empty_text";

/// Letters, numbers and underscore. Combining marks and other connector
/// punctuation split tokens.
static WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+").expect("valid word regex"));

/// NLTK english stop word list.
const ENGLISH_STOP_WORDS: [&str; 179] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Built-in stop word lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopWordLanguage {
    English,
    None,
}

impl StopWordLanguage {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "english" | "en" => Some(Self::English),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }

    fn words(self) -> &'static [&'static str] {
        match self {
            Self::English => &ENGLISH_STOP_WORDS,
            Self::None => &[],
        }
    }
}

/// Normalizes raw text into the canonical embedding input.
///
/// Built once from configuration and shared read-only.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: HashSet<String>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(StopWordLanguage::English, std::iter::empty::<&str>())
    }
}

impl TextNormalizer {
    /// Create a normalizer from a built-in list plus extra stop words.
    ///
    /// Extra words are lowercased so they match lowercased tokens.
    pub fn new<I, S>(language: StopWordLanguage, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words: HashSet<String> =
            language.words().iter().map(|w| w.to_string()).collect();
        stop_words.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );

        Self { stop_words }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Normalize a single text. `None` stands for a missing or non-string value.
    pub fn normalize(&self, text: Option<&str>) -> String {
        let text = match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return EMPTY_TEXT.to_string(),
        };

        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = WORD_REGEX
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.is_stop_word(token))
            .collect();

        if tokens.is_empty() {
            return EMPTY_TEXT.to_string();
        }

        tokens.join(" ")
    }

    /// Normalize every text of a batch, preserving order.
    pub fn normalize_batch<T: RawText>(&self, texts: &[T]) -> Vec<String> {
        texts.iter().map(|t| self.normalize(t.as_raw())).collect()
    }
}

/// Anything that can stand in for a scraped text.
///
/// Implemented for string types and their `Option`s so callers can pass
/// records with missing values straight through.
pub trait RawText {
    fn as_raw(&self) -> Option<&str>;
}

impl RawText for str {
    fn as_raw(&self) -> Option<&str> {
        Some(self)
    }
}

impl RawText for String {
    fn as_raw(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: RawText + ?Sized> RawText for &T {
    fn as_raw(&self) -> Option<&str> {
        (**self).as_raw()
    }
}

impl<T: RawText> RawText for Option<T> {
    fn as_raw(&self) -> Option<&str> {
        self.as_ref().and_then(|t| t.as_raw())
    }
}
