//! Light, language-selectable stemming.
//!
//! Stems are only used to compare tokens with literals at match time; they
//! are never shown to users or handed to value parsers.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The language used to stem tokens and literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Compare words exactly.
    #[default]
    None,
    English,
    German,
}

const ENGLISH_SUFFIXES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("ing", ""),
    ("ed", ""),
    ("s", ""),
];

const GERMAN_SUFFIXES: &[(&str, &str)] = &[
    ("ern", ""),
    ("em", ""),
    ("en", ""),
    ("er", ""),
    ("es", ""),
    ("e", ""),
    ("n", ""),
    ("s", ""),
];

/// Shortest stem a suffix rule may leave behind.
const MIN_STEM: usize = 3;

impl Language {
    /// Stem a lowercase word.
    pub fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        let suffixes = match self {
            Language::None => return Cow::Borrowed(word),
            Language::English => ENGLISH_SUFFIXES,
            Language::German => GERMAN_SUFFIXES,
        };

        if !word.chars().all(char::is_alphabetic) {
            return Cow::Borrowed(word);
        }

        if *self == Language::English && word.ends_with("ss") {
            return Cow::Borrowed(word);
        }

        for (suffix, replacement) in suffixes {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.chars().count() >= MIN_STEM {
                    return Cow::Owned(format!("{stem}{replacement}"));
                }
            }
        }

        Cow::Borrowed(word)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::None => write!(f, "none"),
            Language::English => write!(f, "english"),
            Language::German => write!(f, "german"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Language::None),
            "english" | "en" => Ok(Language::English),
            "german" | "de" => Ok(Language::German),
            other => Err(format!("unsupported language `{other}`")),
        }
    }
}
