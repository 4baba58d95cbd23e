//! Tokenization of utterances.
//!
//! Utterances are split into words, spelled-out numbers are folded into
//! digit tokens, and each token gets a comparison key (its stem in the
//! configured [`Language`]). The unstemmed text is kept alongside so captured
//! spans read the way the user said them.

use crate::number::fold_numbers;
use crate::stem::Language;

/// A single token of an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercased text after number folding (`"22"` for `"twenty two"`).
    pub text: String,
    /// The words as typed, space-joined for folded numbers.
    pub original: String,
    /// The comparison form used against literals.
    pub key: String,
    /// Position of the token's first word in the input.
    pub index: usize,
}

impl Token {
    /// Returns the token's integer value, if it is a number.
    pub fn number(&self) -> Option<i64> {
        self.text.parse().ok()
    }
}

/// Splits utterances into [`Token`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    language: Language,
}

impl Tokenizer {
    pub fn new(language: Language) -> Self {
        Tokenizer { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Tokenize an utterance.
    ///
    /// Anything other than letters, digits and apostrophes inside a word acts
    /// as a separator, so `"twenty-two."` yields the single token `22`.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let words = split_words(text);
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let tokens: Vec<Token> = fold_numbers(&lowered)
            .into_iter()
            .map(|folded| {
                let original = words[folded.words.clone()].join(" ");
                let key = self.language.stem(&folded.text).into_owned();
                Token {
                    text: folded.text,
                    original,
                    key,
                    index: folded.words.start,
                }
            })
            .collect();

        tracing::trace!(%text, count = tokens.len(), "tokenized utterance");
        tokens
    }
}

/// Normalize pattern words the way [`Tokenizer::tokenize`] normalizes an
/// utterance, leaving out stemming: `["Twenty", "two?"]` becomes `["22"]` and
/// `["wi-fi"]` becomes `["wi", "fi"]`.
pub fn normalize_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let lowered: Vec<String> = words
        .iter()
        .flat_map(|word| split_words(word.as_ref()))
        .map(str::to_lowercase)
        .collect();
    fold_numbers(&lowered)
        .into_iter()
        .map(|folded| folded.text)
        .collect()
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Join the `text` of a token span with single spaces.
pub fn join_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join the `original` of a token span with single spaces.
pub fn join_original(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.original.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
