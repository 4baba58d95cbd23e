//! Backtracking matcher over compiled grammars.
//!
//! A grammar matches a token window only if it consumes the whole window.
//! Matching runs on an explicit work stack instead of native recursion: the
//! pending work of a partial match is a persistent list of frames (nodes still
//! to match, captures still to close), and every choice point pushes its
//! untried alternatives onto a stack of saved states. Popping a saved state
//! is backtracking. The first state that runs out of frames exactly at the
//! end of the window wins, which gives declaration-order semantics for
//! alternations, present-before-absent for optionals and greedy long
//! wildcards.
//!
//! When no candidate accepts the full utterance, [`Matcher::find`] retries on
//! trimmed sub-windows so that noise around a valid command is tolerated.

use std::borrow::Cow;
use std::ops::Range;
use std::rc::Rc;

use crate::ast::GrammarNode;
use crate::number::word_value;
use crate::stem::Language;
use crate::token::Token;

/// Default shortest sub-window tried by the trimming fallback.
pub const DEFAULT_MIN_WINDOW: usize = 3;

/// What a capture records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureKind {
    /// The span consumed by an entity reference.
    Entity(String),
    /// A token consumed by `+` or a span consumed by `*`.
    Wildcard,
    /// A token consumed by `#`.
    Number,
}

/// A captured span of the utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub kind: CaptureKind,
    /// Token indices into the full utterance.
    pub span: Range<usize>,
}

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMatch {
    /// Index of the winning candidate.
    pub candidate: usize,
    /// The token window the candidate consumed.
    pub window: Range<usize>,
    /// Captures in the order they closed.
    pub captures: Vec<Capture>,
}

impl GrammarMatch {
    /// The span captured for entity `id`. When an entity was captured more
    /// than once the earliest span wins.
    pub fn entity_span(&self, id: &str) -> Option<Range<usize>> {
        self.captures
            .iter()
            .filter(|c| matches!(&c.kind, CaptureKind::Entity(e) if e == id))
            .map(|c| c.span.clone())
            .min_by_key(|span| span.start)
    }

    /// Numbers captured by `#` slots, left to right.
    pub fn numbers(&self, tokens: &[Token]) -> Vec<i64> {
        let mut spans: Vec<&Capture> = self
            .captures
            .iter()
            .filter(|c| c.kind == CaptureKind::Number)
            .collect();
        spans.sort_by_key(|c| c.span.start);
        spans
            .into_iter()
            .filter_map(|c| tokens.get(c.span.start).and_then(Token::number))
            .collect()
    }
}

/// Matches token sequences against grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    language: Language,
    min_window: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::new(Language::None)
    }
}

impl Matcher {
    pub fn new(language: Language) -> Self {
        Matcher {
            language,
            min_window: DEFAULT_MIN_WINDOW,
        }
    }

    /// Set the shortest sub-window the trimming fallback will try.
    pub fn with_min_window(mut self, min_window: usize) -> Self {
        self.min_window = min_window.max(1);
        self
    }

    pub fn min_window(&self) -> usize {
        self.min_window
    }

    /// Match `tokens` against `candidates`, trimming noise if needed.
    ///
    /// The full utterance is tried first. Then sub-windows are tried with the
    /// start index ascending and, for each start, the end index descending,
    /// so the longest surviving window for a start comes first. Windows
    /// shorter than the minimum window are refused; for utterances no longer
    /// than the minimum the floor drops to one token less than the utterance.
    /// Within a window, candidates are tried in order and the first match
    /// wins.
    pub fn find(&self, candidates: &[&GrammarNode], tokens: &[Token]) -> Option<GrammarMatch> {
        let len = tokens.len();

        if let Some(found) = self.find_in_window(candidates, tokens, 0..len) {
            return Some(found);
        }

        if len < 2 {
            return None;
        }

        let floor = self.min_window.min(len - 1).max(1);
        for start in 0..len {
            for end in (start + floor..=len).rev() {
                if start == 0 && end == len {
                    continue;
                }
                if let Some(found) = self.find_in_window(candidates, tokens, start..end) {
                    tracing::debug!(window = ?found.window, len, "matched trimmed window");
                    return Some(found);
                }
            }
        }

        None
    }

    /// Match a single grammar against exactly the given tokens, without
    /// trimming. Returns the captures on success.
    pub fn matches_exactly(&self, grammar: &GrammarNode, tokens: &[Token]) -> Option<Vec<Capture>> {
        self.run(grammar, tokens, 0)
    }

    fn find_in_window(
        &self,
        candidates: &[&GrammarNode],
        tokens: &[Token],
        window: Range<usize>,
    ) -> Option<GrammarMatch> {
        let slice = &tokens[window.clone()];
        candidates
            .iter()
            .enumerate()
            .find_map(|(candidate, grammar)| {
                self.run(grammar, slice, window.start)
                    .map(|captures| GrammarMatch {
                        candidate,
                        window: window.clone(),
                        captures,
                    })
            })
    }

    fn literal_key<'a>(&self, word: &'a str) -> Cow<'a, str> {
        match word_value(word) {
            Some(value) => Cow::Owned(value.to_string()),
            None => self.language.stem(word),
        }
    }

    /// Run one grammar over `tokens`; capture spans are shifted by `offset`.
    fn run(&self, grammar: &GrammarNode, tokens: &[Token], offset: usize) -> Option<Vec<Capture>> {
        let len = tokens.len();
        let mut saved = vec![State {
            pos: 0,
            frames: push(Frame::Node(grammar), None),
            trail: None,
        }];

        while let Some(mut state) = saved.pop() {
            'state: loop {
                let Some(frame) = state.frames.take() else {
                    if state.pos == len {
                        return Some(collect(state.trail, offset));
                    }
                    break 'state;
                };
                state.frames = frame.next.clone();

                let node: &GrammarNode = match &frame.step {
                    Frame::Close { kind, start } => {
                        state.trail = record(state.trail, kind.clone(), *start..state.pos);
                        continue 'state;
                    }
                    Frame::Node(node) => *node,
                };

                match node {
                    GrammarNode::Literal(word) => {
                        let matched = tokens
                            .get(state.pos)
                            .is_some_and(|token| token.key == self.literal_key(word));
                        if !matched {
                            break 'state;
                        }
                        state.pos += 1;
                    }
                    GrammarNode::Sequence(children) => {
                        for child in children.iter().rev() {
                            state.frames = push(Frame::Node(child), state.frames.take());
                        }
                    }
                    GrammarNode::Alternation(branches) => {
                        let Some((first, rest)) = branches.split_first() else {
                            break 'state;
                        };
                        for branch in rest.iter().rev() {
                            saved.push(State {
                                pos: state.pos,
                                frames: push(Frame::Node(branch), state.frames.clone()),
                                trail: state.trail.clone(),
                            });
                        }
                        state.frames = push(Frame::Node(first), state.frames.take());
                    }
                    GrammarNode::Optional(inner) => {
                        saved.push(State {
                            pos: state.pos,
                            frames: state.frames.clone(),
                            trail: state.trail.clone(),
                        });
                        state.frames = push(Frame::Node(inner), state.frames.take());
                    }
                    GrammarNode::ShortWildcard => {
                        if state.pos >= len {
                            break 'state;
                        }
                        state.trail = record(
                            state.trail,
                            CaptureKind::Wildcard,
                            state.pos..state.pos + 1,
                        );
                        state.pos += 1;
                    }
                    GrammarNode::LongWildcard => {
                        // Shorter spans are saved so the longest is tried first.
                        for end in state.pos..len {
                            saved.push(State {
                                pos: end,
                                frames: state.frames.clone(),
                                trail: record(
                                    state.trail.clone(),
                                    CaptureKind::Wildcard,
                                    state.pos..end,
                                ),
                            });
                        }
                        state.trail =
                            record(state.trail, CaptureKind::Wildcard, state.pos..len);
                        state.pos = len;
                    }
                    GrammarNode::NumberSlot => {
                        let is_number = tokens
                            .get(state.pos)
                            .is_some_and(|token| token.number().is_some());
                        if !is_number {
                            break 'state;
                        }
                        state.trail =
                            record(state.trail, CaptureKind::Number, state.pos..state.pos + 1);
                        state.pos += 1;
                    }
                    GrammarNode::EntityReference { id, grammar } => {
                        let close = push(
                            Frame::Close {
                                kind: CaptureKind::Entity(id.clone()),
                                start: state.pos,
                            },
                            state.frames.take(),
                        );
                        state.frames = push(Frame::Node(grammar), close);
                    }
                }
            }
        }

        None
    }
}

/// Pending work of a partial match.
enum Frame<'g> {
    Node(&'g GrammarNode),
    Close { kind: CaptureKind, start: usize },
}

struct Link<'g> {
    step: Frame<'g>,
    next: Frames<'g>,
}

type Frames<'g> = Option<Rc<Link<'g>>>;

fn push<'g>(step: Frame<'g>, next: Frames<'g>) -> Frames<'g> {
    Some(Rc::new(Link { step, next }))
}

/// Captures recorded so far, newest first.
struct Trail {
    capture: Capture,
    prev: Option<Rc<Trail>>,
}

fn record(prev: Option<Rc<Trail>>, kind: CaptureKind, span: Range<usize>) -> Option<Rc<Trail>> {
    Some(Rc::new(Trail {
        capture: Capture { kind, span },
        prev,
    }))
}

fn collect(mut trail: Option<Rc<Trail>>, offset: usize) -> Vec<Capture> {
    let mut captures = Vec::new();
    while let Some(link) = trail {
        let span = link.capture.span.start + offset..link.capture.span.end + offset;
        captures.push(Capture {
            kind: link.capture.kind.clone(),
            span,
        });
        trail = link.prev.clone();
    }
    captures.reverse();
    captures
}

struct State<'g> {
    pos: usize,
    frames: Frames<'g>,
    trail: Option<Rc<Trail>>,
}
