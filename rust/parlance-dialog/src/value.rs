//! Typed entity values and the parsers that produce them.
//!
//! Captured spans are turned into values according to the entity's
//! [`ValueKind`]: numbers and times are parsed from the normalized token
//! text, free text keeps the words as the user typed them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use parlance_grammar::token::{join_original, join_text};
use parlance_grammar::{Token, Tokenizer};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Entity values keyed by entity id.
pub type EntityMap = BTreeMap<String, EntityValue>;

/// How a captured span is turned into an [`EntityValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    #[default]
    Text,
    Time,
}

/// The value bound to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityValue {
    Number(i64),
    Text(String),
    Time { hour: u32, minute: u32 },
}

impl EntityValue {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            EntityValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntityValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The `(hour, minute)` of a time value.
    pub fn as_time(&self) -> Option<(u32, u32)> {
        match self {
            EntityValue::Time { hour, minute } => Some((*hour, *minute)),
            _ => None,
        }
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityValue::Number(n) => write!(f, "{n}"),
            EntityValue::Text(text) => write!(f, "{text}"),
            EntityValue::Time { hour, minute } => write!(f, "{hour:02}:{minute:02}"),
        }
    }
}

/// Type a captured token span. Empty spans and failed parses yield `None`.
pub fn parse_value(kind: ValueKind, tokens: &[Token]) -> Option<EntityValue> {
    if tokens.is_empty() {
        return None;
    }
    match kind {
        ValueKind::Number => parse_number(&join_text(tokens)).map(EntityValue::Number),
        ValueKind::Time => {
            parse_time(&join_text(tokens)).map(|(hour, minute)| EntityValue::Time { hour, minute })
        }
        ValueKind::Text => Some(EntityValue::Text(join_original(tokens))),
    }
}

/// Parse an integer. Spelled-out numbers are folded first, so `"twenty two"`
/// parses as 22. Non-numeric text is `None`, never zero.
pub fn parse_number(text: &str) -> Option<i64> {
    text.trim()
        .parse()
        .ok()
        .or_else(|| normalize(text).parse().ok())
}

static DIGITAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}) (?:(?:x|oh) (\d{1,2})|(\d{2}))\b").unwrap()
});

static OCLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}) (?:o'clock|oclock|o clock)\b").unwrap());

static PAST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(quarter|half|\d{1,2}) past (\d{1,2})\b").unwrap());

static TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(quarter|\d{1,2}) to (\d{1,2})\b").unwrap());

static MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}) ?[ap]m\b").unwrap());

static AM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d ?am\b").unwrap());

/// Parse a time of day into `(hour, minute)`.
///
/// The digital idiom (`17 x 3`, `7 oh 5`, `7 30`) is tried first, then the
/// spoken idioms (`5 o'clock`, `quarter past 5`, `20 to 6`, `5 pm`). When
/// the text contains `pm` anywhere and the hour is in 12-hour form, twelve
/// hours are added (`12 pm` stays 12); `12 am` becomes 0.
pub fn parse_time(text: &str) -> Option<(u32, u32)> {
    let normalized = normalize(text);
    let (hour, minute) = digital(&normalized).or_else(|| spoken(&normalized))?;

    let hour = if normalized.contains("pm") && hour <= 12 {
        match hour + 12 {
            24 => 12,
            adjusted => adjusted,
        }
    } else if hour == 12 && AM_RE.is_match(&normalized) {
        0
    } else {
        hour
    };

    (hour < 24 && minute < 60).then_some((hour, minute))
}

fn normalize(text: &str) -> String {
    join_text(&Tokenizer::default().tokenize(text))
}

fn number(captures: &Captures<'_>, group: usize) -> Option<u32> {
    captures.get(group)?.as_str().parse().ok()
}

fn digital(text: &str) -> Option<(u32, u32)> {
    let captures = DIGITAL_RE.captures(text)?;
    let hour = number(&captures, 1)?;
    let minute = number(&captures, 2).or_else(|| number(&captures, 3))?;
    Some((hour, minute))
}

fn spoken(text: &str) -> Option<(u32, u32)> {
    if let Some(captures) = OCLOCK_RE.captures(text) {
        return Some((number(&captures, 1)?, 0));
    }

    if let Some(captures) = PAST_RE.captures(text) {
        let minute = match &captures[1] {
            "quarter" => 15,
            "half" => 30,
            digits => digits.parse().ok()?,
        };
        return Some((number(&captures, 2)?, minute));
    }

    if let Some(captures) = TO_RE.captures(text) {
        let before = match &captures[1] {
            "quarter" => 15,
            digits => digits.parse().ok()?,
        };
        let hour = number(&captures, 2)?;
        if !(1..60).contains(&before) || hour > 24 {
            return None;
        }
        return Some(((hour + 23) % 24, 60 - before));
    }

    MERIDIEM_RE
        .captures(text)
        .and_then(|captures| Some((number(&captures, 1)?, 0)))
}
