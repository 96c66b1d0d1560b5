//! Module I: the task facade (§6) composing modules B–H into the five
//! entry points tooling actually calls — lexing alone rarely matters in
//! isolation once a document is being edited.

use thiserror::Error;
use triomphe::Arc;

use crate::common::error::CommonError;
use crate::common::position::Position;
use crate::inspection::{self, Inspected};
use crate::lexer::{lex_from_split, LexError, LexerState};
use crate::parser::{self, ParseError, ParseOk};
use crate::settings::Settings;
use crate::snapshot::{self, Snapshot};

#[derive(Debug, Error, Clone)]
pub enum TaskError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Common(#[from] CommonError),
}

/// §6 "tryLex": always succeeds, the per-line error map is read off the
/// returned state rather than failing the call.
pub fn try_lex(text: &str, line_terminator: &str) -> LexerState {
    lex_from_split(text, line_terminator)
}

/// The result of lexing and parsing a document together: the parse itself
/// may have failed, but the lexer state and snapshot are always available
/// for inspection to fall back on.
#[derive(Debug, Clone)]
pub struct LexParseOk {
    pub lexer_state: LexerState,
    pub snapshot: Arc<Snapshot>,
    pub tried_parse: Result<ParseOk, ParseError>,
}

/// §6 "tryLexParse": fails only if lexing itself left an error line map;
/// a malformed-but-lexically-clean document still returns `Ok` with
/// `triedParse` carrying the parse error.
pub fn try_lex_parse(settings: &Settings, text: &str, line_terminator: &str) -> Result<LexParseOk, TaskError> {
    let lexer_state = try_lex(text, line_terminator);
    let snapshot = Arc::new(snapshot::try_snapshot(&lexer_state)?);
    let tried_parse = parser::try_parse(settings, snapshot.clone());
    Ok(LexParseOk {
        lexer_state,
        snapshot,
        tried_parse,
    })
}

/// §6 "tryParse": parses an already-lexed [`Snapshot`] directly.
pub fn try_parse(settings: &Settings, snapshot: Arc<Snapshot>) -> Result<ParseOk, ParseError> {
    parser::try_parse(settings, snapshot)
}

/// §6 "tryInspection": runs module H against an already-attempted parse.
pub fn try_inspection(
    settings: &Settings,
    tried_parse: &Result<ParseOk, ParseError>,
    snapshot: &Arc<Snapshot>,
    position: Position,
) -> Result<Inspected, CommonError> {
    inspection::try_inspection(settings, tried_parse, snapshot, position)
}

/// §6 "tryLexParseInspection": the one call most editor integrations
/// actually want — lex, parse, and inspect a cursor position in one shot.
pub fn try_lex_parse_inspection(
    settings: &Settings,
    text: &str,
    line_terminator: &str,
    position: Position,
) -> Result<Inspected, TaskError> {
    let lex_parse = try_lex_parse(settings, text, line_terminator)?;
    let inspected = try_inspection(settings, &lex_parse.tried_parse, &lex_parse.snapshot, position)?;
    Ok(inspected)
}
