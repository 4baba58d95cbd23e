//! Recursive-descent compiler for the pattern language.
//!
//! Converts a lexeme stream (from [`crate::lexer`]) into a [`GrammarNode`].
//!
//! ```text
//! pattern     = alternation EOF
//! alternation = sequence ('|' sequence)*
//! sequence    = term*
//! term        = WORD+                   → Literal per normalized token
//!             | '+'                     → ShortWildcard
//!             | '*'                     → LongWildcard
//!             | '#'                     → NumberSlot
//!             | ENTITY                  → EntityReference (resolved)
//!             | '(' alternation ')'     → Alternation
//!             | '[' alternation ']'     → Optional
//! ```
//!
//! A top-level `|` is accepted, so `stop|cancel` compiles like `(stop|cancel)`.

use std::sync::Arc;

use crate::ast::GrammarNode;
use crate::error::CompileError;
use crate::lexer::{Lexeme, Spanned, lex};
use crate::token::normalize_words;

/// Looks up entity grammars while compiling `{id}` references.
pub trait EntityResolver {
    /// The compiled grammar for `id`, if it is known.
    fn resolve(&self, id: &str) -> Option<Arc<GrammarNode>>;
}

/// A resolver that knows no entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntities;

impl EntityResolver for NoEntities {
    fn resolve(&self, _id: &str) -> Option<Arc<GrammarNode>> {
        None
    }
}

impl<R: EntityResolver + ?Sized> EntityResolver for &R {
    fn resolve(&self, id: &str) -> Option<Arc<GrammarNode>> {
        (**self).resolve(id)
    }
}

impl EntityResolver for std::collections::HashMap<String, Arc<GrammarNode>> {
    fn resolve(&self, id: &str) -> Option<Arc<GrammarNode>> {
        self.get(id).cloned()
    }
}

struct Parser<'a, R: ?Sized> {
    pattern: &'a str,
    lexemes: Vec<Spanned>,
    pos: usize,
    resolver: &'a R,
}

impl<'a, R: EntityResolver + ?Sized> Parser<'a, R> {
    fn peek(&self) -> Option<&Spanned> {
        self.lexemes.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.lexemes.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn end_position(&self) -> usize {
        self.pattern.len()
    }

    fn parse_alternation(&mut self) -> Result<GrammarNode, CompileError> {
        let start = self.peek().map(|s| s.position).unwrap_or(self.end_position());
        let mut branches = vec![self.parse_sequence(start)?];
        while let Some(Spanned {
            lexeme: Lexeme::Pipe,
            position,
        }) = self.peek().cloned()
        {
            self.advance();
            branches.push(self.parse_sequence(position)?);
        }
        Ok(GrammarNode::alternation(branches))
    }

    /// Parse terms until a closing delimiter, a pipe or the end of input.
    /// `start` is reported if the sequence turns out to be empty.
    fn parse_sequence(&mut self, start: usize) -> Result<GrammarNode, CompileError> {
        let mut terms = Vec::new();
        loop {
            match self.peek().map(|s| &s.lexeme) {
                None
                | Some(Lexeme::Pipe)
                | Some(Lexeme::Close)
                | Some(Lexeme::CloseOptional) => break,
                Some(_) => terms.push(self.parse_term()?),
            }
        }

        match GrammarNode::sequence(terms) {
            GrammarNode::Sequence(children) if children.is_empty() => Err(CompileError::EmptyGroup {
                position: start,
                pattern: self.pattern.to_string(),
            }),
            node => Ok(node),
        }
    }

    /// Consume a run of adjacent words as one phrase, so literals split and
    /// fold exactly like utterance tokens (`twenty two` is the literal `22`).
    fn parse_words(&mut self) -> Vec<GrammarNode> {
        let mut words = Vec::new();
        while let Some(Spanned {
            lexeme: Lexeme::Word(word),
            ..
        }) = self.peek()
        {
            words.push(word.clone());
            self.advance();
        }
        normalize_words(&words)
            .into_iter()
            .map(GrammarNode::Literal)
            .collect()
    }

    fn parse_term(&mut self) -> Result<GrammarNode, CompileError> {
        let Some(Spanned { lexeme, position }) = self.advance() else {
            return Err(self.unexpected("a term", "end of pattern", self.end_position()));
        };

        match lexeme {
            Lexeme::Word(_) => {
                self.pos -= 1;
                Ok(GrammarNode::sequence(self.parse_words()))
            }
            Lexeme::Plus => Ok(GrammarNode::ShortWildcard),
            Lexeme::Star => Ok(GrammarNode::LongWildcard),
            Lexeme::Hash => Ok(GrammarNode::NumberSlot),
            Lexeme::Entity(id) => match self.resolver.resolve(&id) {
                Some(grammar) => Ok(GrammarNode::EntityReference { id, grammar }),
                None => Err(CompileError::UnknownEntity {
                    id,
                    position,
                    pattern: self.pattern.to_string(),
                }),
            },
            Lexeme::Open => {
                let inner = self.parse_group(position, '(')?;
                self.expect_close(Lexeme::Close, '(', position)?;
                // `(a)` is just `a`; keep alternations explicit otherwise.
                Ok(inner)
            }
            Lexeme::OpenOptional => {
                let inner = self.parse_group(position, '[')?;
                self.expect_close(Lexeme::CloseOptional, '[', position)?;
                Ok(GrammarNode::optional(inner))
            }
            Lexeme::Close => Err(self.unbalanced(')', position)),
            Lexeme::CloseOptional => Err(self.unbalanced(']', position)),
            Lexeme::Pipe => Err(self.unexpected("a term", "`|`", position)),
        }
    }

    fn parse_group(&mut self, open: usize, delimiter: char) -> Result<GrammarNode, CompileError> {
        if self.peek().is_none() {
            return Err(self.unbalanced(delimiter, open));
        }
        self.parse_alternation()
    }

    fn expect_close(
        &mut self,
        close: Lexeme,
        delimiter: char,
        open: usize,
    ) -> Result<(), CompileError> {
        match self.advance() {
            Some(spanned) if spanned.lexeme == close => Ok(()),
            Some(Spanned { lexeme, position }) => {
                Err(self.unexpected(&format!("closing for `{delimiter}`"), &lexeme.to_string(), position))
            }
            None => Err(self.unbalanced(delimiter, open)),
        }
    }

    fn unbalanced(&self, delimiter: char, position: usize) -> CompileError {
        CompileError::Unbalanced {
            delimiter,
            position,
            pattern: self.pattern.to_string(),
        }
    }

    fn unexpected(&self, expected: &str, found: &str, position: usize) -> CompileError {
        CompileError::Unexpected {
            expected: expected.to_string(),
            found: found.to_string(),
            position,
            pattern: self.pattern.to_string(),
        }
    }

    fn parse_pattern(&mut self) -> Result<GrammarNode, CompileError> {
        if self.lexemes.is_empty() {
            return Err(CompileError::Empty);
        }

        let node = self.parse_alternation()?;

        match self.advance() {
            None => Ok(node),
            Some(Spanned {
                lexeme: Lexeme::Close,
                position,
            }) => Err(self.unbalanced(')', position)),
            Some(Spanned {
                lexeme: Lexeme::CloseOptional,
                position,
            }) => Err(self.unbalanced(']', position)),
            Some(Spanned { lexeme, position }) => {
                Err(self.unexpected("end of pattern", &lexeme.to_string(), position))
            }
        }
    }
}

/// Compile pattern text into a grammar, resolving `{id}` references through
/// `resolver`.
///
/// # Example
///
/// ```
/// use parlance_grammar::{compile, GrammarNode, NoEntities};
///
/// let grammar = compile("play # [#]", &NoEntities).unwrap();
/// assert_eq!(
///     grammar,
///     GrammarNode::Sequence(vec![
///         GrammarNode::literal("play"),
///         GrammarNode::NumberSlot,
///         GrammarNode::optional(GrammarNode::NumberSlot),
///     ])
/// );
/// ```
pub fn compile<R>(pattern: &str, resolver: &R) -> Result<GrammarNode, CompileError>
where
    R: EntityResolver + ?Sized,
{
    let lexemes = lex(pattern)?;
    let mut parser = Parser {
        pattern,
        lexemes,
        pos: 0,
        resolver,
    };
    let node = parser.parse_pattern()?;
    tracing::trace!(%pattern, grammar = %node, "compiled pattern");
    Ok(node)
}
