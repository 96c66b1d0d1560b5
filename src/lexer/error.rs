use thiserror::Error;

use crate::common::position::Position;

use super::mode::LineMode;

/// §6 `BadLineNumber` sub-kind: which direction the requested line index
/// was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadLineNumberKind {
    GreaterThanNumLines,
    LessThanZero,
}

/// §6 `BadRange` sub-kinds. The literal set enumerated in §6; despite the
/// prose there saying "eight", only seven distinct cases are actually
/// listed, and we implement exactly those seven stable tags rather than
/// inventing an eighth (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadRangeKind {
    SameLineCodeUnitStartHigher,
    LineNumberStartGreaterThanLineNumberEnd,
    LineNumberStartLessThanZero,
    LineNumberStartGreaterThanNumLines,
    LineNumberEndGreaterThanNumLines,
    LineCodeUnitStartGreaterThanLineLength,
    LineCodeUnitEndGreaterThanLineLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    HexLiteral,
    KeywordOrIdentifier,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnterminatedMultilineTokenKind {
    MultilineComment,
    QuotedIdentifier,
    String,
}

/// A single line's worth of lexing failure, stored in `errorLineMap`
/// (§3 "LexerState").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineLexError {
    #[error("expected {kind:?} at {position:?}")]
    Expected { kind: ExpectedKind, position: Position },

    #[error("unterminated {kind:?} opened at {opening_position:?}")]
    UnterminatedMultilineToken {
        kind: UnterminatedMultilineTokenKind,
        opening_position: Position,
    },

    #[error("unexpected read at {0:?}")]
    UnexpectedRead(Position),

    #[error("unexpected end of stream at {0:?}")]
    UnexpectedEof(Position),
}

/// API-level lexer errors (§6/§7): malformed requests against a
/// [`super::state::LexerState`], distinct from the per-line errors recorded
/// in `errorLineMap`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("bad line number: {kind:?} (line {line_number}, numLines {num_lines})")]
    BadLineNumber {
        kind: BadLineNumberKind,
        line_number: i64,
        num_lines: usize,
    },

    #[error("bad range: {kind:?}")]
    BadRange { kind: BadRangeKind },

    #[error("lexer state is internally inconsistent")]
    BadState,

    #[error("unexpected end of stream")]
    EndOfStream,

    #[error("unexpected end of stream partway through a read")]
    EndOfStreamPartwayRead,

    #[error(transparent)]
    Expected(#[from] ExpectedWrapper),

    #[error("one or more lines failed to lex")]
    LineMap(std::collections::BTreeMap<usize, LineLexError>),

    #[error("unexpected read")]
    UnexpectedRead,

    #[error(transparent)]
    UnterminatedMultilineToken(#[from] UnterminatedWrapper),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {kind:?}")]
pub struct ExpectedWrapper {
    pub kind: ExpectedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unterminated {kind:?}")]
pub struct UnterminatedWrapper {
    pub kind: UnterminatedMultilineTokenKind,
}

/// What a relex propagation pass observed about a downstream line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropagationOutcome {
    /// The line's leaving mode matches what was previously recorded;
    /// propagation can stop here.
    Stable,
    /// The leaving mode changed, so the following line must be relexed too.
    Changed(LineMode),
}
