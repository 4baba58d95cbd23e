//! Spelled-out number folding.
//!
//! Number slots consume exactly one token, so spoken numbers have to become a
//! single digit token before matching: `twenty two` → `22`, `ten` → `10`.
//! Only zero through ninety-nine are recognized.

use std::ops::Range;

const UNITS: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 8] = [
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// The value of a single number word below twenty.
pub fn unit_value(word: &str) -> Option<u32> {
    UNITS.iter().position(|u| *u == word).map(|i| i as u32)
}

/// The value of a tens word (`twenty` … `ninety`).
pub fn tens_value(word: &str) -> Option<u32> {
    TENS.iter().position(|t| *t == word).map(|i| (i as u32 + 2) * 10)
}

/// The value of a single number word, units or tens.
pub fn word_value(word: &str) -> Option<u32> {
    unit_value(word).or_else(|| tens_value(word))
}

/// The spelled-out English form of `n` (0–99).
pub fn spell(n: u32) -> Option<String> {
    match n {
        0..=19 => Some(UNITS[n as usize].to_string()),
        20..=99 => {
            let tens = TENS[(n / 10 - 2) as usize];
            match n % 10 {
                0 => Some(tens.to_string()),
                unit => Some(format!("{tens} {}", UNITS[unit as usize])),
            }
        }
        _ => None,
    }
}

/// A word or folded number phrase, with the range of input words it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folded {
    pub text: String,
    pub words: Range<usize>,
}

/// Fold spelled-out numbers in a sequence of lowercase words.
///
/// A tens word followed by a unit word from one to nine merges into a single
/// entry; every other word passes through unchanged.
pub fn fold_numbers<S: AsRef<str>>(words: &[S]) -> Vec<Folded> {
    let mut folded = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        let word = words[i].as_ref();

        if let Some(tens) = tens_value(word) {
            let unit = words
                .get(i + 1)
                .and_then(|next| unit_value(next.as_ref()))
                .filter(|unit| (1..=9).contains(unit));
            if let Some(unit) = unit {
                folded.push(Folded {
                    text: (tens + unit).to_string(),
                    words: i..i + 2,
                });
                i += 2;
            } else {
                folded.push(Folded {
                    text: tens.to_string(),
                    words: i..i + 1,
                });
                i += 1;
            }
            continue;
        }

        let text = match unit_value(word) {
            Some(value) => value.to_string(),
            None => word.to_string(),
        };
        folded.push(Folded {
            text,
            words: i..i + 1,
        });
        i += 1;
    }

    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        let words: Vec<&str> = input.split_whitespace().collect();
        fold_numbers(&words).into_iter().map(|f| f.text).collect()
    }

    #[test]
    fn test_fold_compound() {
        assert_eq!(texts("twenty two"), vec!["22"]);
        assert_eq!(texts("play ninety nine now"), vec!["play", "99", "now"]);
    }

    #[test]
    fn test_fold_tens_alone() {
        assert_eq!(texts("twenty minutes"), vec!["20", "minutes"]);
        assert_eq!(texts("twenty ten"), vec!["20", "10"]);
        assert_eq!(texts("thirty zero"), vec!["30", "0"]);
    }

    #[test]
    fn test_fold_ranges() {
        let folded = fold_numbers(&["at", "forty", "five", "sharp"]);
        assert_eq!(folded[1].words, 1..3);
        assert_eq!(folded[2].words, 3..4);
    }

    #[test]
    fn test_spell_all() {
        for n in 0..100 {
            let spelled = spell(n).unwrap();
            assert_eq!(texts(&spelled), vec![n.to_string()], "{spelled}");
        }
        assert_eq!(spell(100), None);
    }

    #[test]
    fn test_oh_is_not_a_number() {
        assert_eq!(texts("seven oh five"), vec!["7", "oh", "5"]);
    }
}
