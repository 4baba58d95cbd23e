//! Lexer for the pattern language.
//!
//! Splits pattern text into classified lexemes before parsing:
//! - **Word**: a literal word (lowercased; may contain `'` and `-`)
//! - **Entity**: `{id}`
//! - **Open** / **Close**: `(` and `)`
//! - **OpenOptional** / **CloseOptional**: `[` and `]`
//! - **Pipe**: `|`
//! - **Plus**, **Star**, **Hash**: the wildcards and the number slot
//!
//! Whitespace separates words and is otherwise dropped.

use std::fmt;

use crate::error::CompileError;

/// A classified lexeme of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Word(String),
    Entity(String),
    Open,
    Close,
    OpenOptional,
    CloseOptional,
    Pipe,
    Plus,
    Star,
    Hash,
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Word(w) => write!(f, "`{w}`"),
            Lexeme::Entity(id) => write!(f, "`{{{id}}}`"),
            Lexeme::Open => write!(f, "`(`"),
            Lexeme::Close => write!(f, "`)`"),
            Lexeme::OpenOptional => write!(f, "`[`"),
            Lexeme::CloseOptional => write!(f, "`]`"),
            Lexeme::Pipe => write!(f, "`|`"),
            Lexeme::Plus => write!(f, "`+`"),
            Lexeme::Star => write!(f, "`*`"),
            Lexeme::Hash => write!(f, "`#`"),
        }
    }
}

/// A lexeme together with its byte offset in the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub lexeme: Lexeme,
    pub position: usize,
}

fn is_operator(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '|' | '+' | '*' | '#' | '{' | '}')
}

fn is_entity_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
}

/// Lex a pattern into a sequence of positioned lexemes.
pub fn lex(pattern: &str) -> Result<Vec<Spanned>, CompileError> {
    let mut lexemes = Vec::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }

        let lexeme = match ch {
            '(' => Lexeme::Open,
            ')' => Lexeme::Close,
            '[' => Lexeme::OpenOptional,
            ']' => Lexeme::CloseOptional,
            '|' => Lexeme::Pipe,
            '+' => Lexeme::Plus,
            '*' => Lexeme::Star,
            '#' => Lexeme::Hash,
            '}' => {
                return Err(CompileError::Unbalanced {
                    delimiter: '}',
                    position,
                    pattern: pattern.to_string(),
                });
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if !closed {
                    return Err(CompileError::Unbalanced {
                        delimiter: '{',
                        position,
                        pattern: pattern.to_string(),
                    });
                }
                let name = name.trim().to_string();
                if name.is_empty() || !name.chars().all(is_entity_char) {
                    return Err(CompileError::InvalidEntityName {
                        name,
                        position,
                        pattern: pattern.to_string(),
                    });
                }
                Lexeme::Entity(name)
            }
            _ => {
                let mut word = String::new();
                word.extend(ch.to_lowercase());
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_whitespace() || is_operator(next) {
                        break;
                    }
                    word.extend(next.to_lowercase());
                    chars.next();
                }
                Lexeme::Word(word)
            }
        };

        lexemes.push(Spanned { lexeme, position });
    }

    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(pattern: &str) -> Vec<Lexeme> {
        lex(pattern)
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.lexeme)
            .collect()
    }

    #[test]
    fn test_words_and_operators() {
        assert_eq!(
            kinds("Set [a] (timer|alarm) for # *"),
            vec![
                Lexeme::Word("set".into()),
                Lexeme::OpenOptional,
                Lexeme::Word("a".into()),
                Lexeme::CloseOptional,
                Lexeme::Open,
                Lexeme::Word("timer".into()),
                Lexeme::Pipe,
                Lexeme::Word("alarm".into()),
                Lexeme::Close,
                Lexeme::Word("for".into()),
                Lexeme::Hash,
                Lexeme::Star,
            ]
        );
    }

    #[test]
    fn test_entity_reference() {
        assert_eq!(
            kinds("wake me at {time}+"),
            vec![
                Lexeme::Word("wake".into()),
                Lexeme::Word("me".into()),
                Lexeme::Word("at".into()),
                Lexeme::Entity("time".into()),
                Lexeme::Plus,
            ]
        );
    }

    #[test]
    fn test_apostrophe_words() {
        assert_eq!(kinds("# o'clock"), vec![Lexeme::Hash, Lexeme::Word("o'clock".into())]);
    }

    #[test]
    fn test_positions() {
        let lexemes = lex("  play  #").unwrap();
        assert_eq!(lexemes[0].position, 2);
        assert_eq!(lexemes[1].position, 8);
    }

    #[test]
    fn test_unterminated_entity() {
        let err = lex("call {contact").unwrap_err();
        assert!(matches!(err, CompileError::Unbalanced { delimiter: '{', position: 5, .. }));
    }

    #[test]
    fn test_invalid_entity_name() {
        let err = lex("call {}").unwrap_err();
        assert!(matches!(err, CompileError::InvalidEntityName { .. }));
        let err = lex("call {a b}").unwrap_err();
        assert!(matches!(err, CompileError::InvalidEntityName { .. }));
    }
}
