//! Modules D–F (§3, §4.3, §4.4): the AST node-id map, the parse state built
//! on top of it, and the two interchangeable readers that populate it from
//! a [`crate::snapshot::Snapshot`].

mod combinator;
pub mod context;
pub mod error;
pub mod node_id_map;
mod operator_chain;
pub mod reader;
mod recursive_descent;
pub mod xor_node;

use triomphe::Arc;

use crate::ast::AstNodeKind;
use crate::common::cancellation::CancellationToken;
use crate::lexer::TokenKind;
use crate::settings::Settings;
use crate::snapshot::Snapshot;

pub use context::ParseState;
pub use error::{CsvContinuationKind, ParseError, ParseErrorKind};
pub use node_id_map::{ContextNode, NodeIdMapCollection};
pub use reader::ParserKind;
pub use xor_node::XorNode;

/// The result of a successful parse (§4.4 "ParseOk"): the root node plus
/// the id map and final state a caller needs to run inspection against.
#[derive(Debug, Clone)]
pub struct ParseOk {
    pub root: XorNode,
    pub node_id_map: NodeIdMapCollection,
    pub leaf_ids: indexmap::IndexSet<u32>,
    pub state: ParseState,
}

/// Entry point for module F (§6 "tryParse"). Builds a [`ParseState`] from
/// `snapshot`, reads a document with the strategy named in `settings`, and
/// requires every token to have been consumed (§4.4 "UnusedTokensRemain").
pub fn try_parse(settings: &Settings, snapshot: Arc<Snapshot>) -> Result<ParseOk, ParseError> {
    let mut state = ParseState::with_parser_kind(snapshot, settings.parser);
    if let Some(factory) = &settings.parse_state_factory {
        state = factory(state);
    }

    let cancellation: &dyn CancellationToken = settings.cancellation_token.as_ref();
    let root = read_document(&mut state, cancellation)?;

    if !state.at_eof() {
        let first = state.peek_token(0).cloned().expect("checked by at_eof above");
        return Err(ParseError::new(ParseErrorKind::UnusedTokensRemain { first }, state));
    }

    #[cfg(debug_assertions)]
    if let Err(violation) = state.node_id_map.check_invariants() {
        panic!("node id map invariant violated after a successful parse: {violation}");
    }

    Ok(ParseOk {
        root,
        node_id_map: state.node_id_map.clone(),
        leaf_ids: state.node_id_map.leaf_ids.clone(),
        state,
    })
}

/// `document := section | expression` (§3). A leading `section` keyword
/// commits to the section form; otherwise the whole document is a single
/// expression.
fn read_document(state: &mut ParseState, cancellation: &dyn CancellationToken) -> Result<XorNode, ParseError> {
    reader::check_cancellation(state, cancellation)?;
    let id = state.start_context(AstNodeKind::Document);
    if reader::is_attribute_record_ahead(state, &[TokenKind::KeywordSection]) {
        reader::read_attribute_record(state)?;
    }
    if reader::at(state, TokenKind::KeywordSection) {
        read_section(state)?;
    } else if !state.at_eof() {
        // An empty document (no tokens at all) is a childless `Document`
        // rather than an `ExpectedAnyTokenKind` error (§8 boundary case).
        reader::read_expression(state)?;
    }
    Ok(state.end_context(id))
}

fn read_section(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::Section);
    reader::leaf(state, AstNodeKind::Constant, TokenKind::KeywordSection)?;
    if reader::at(state, TokenKind::Identifier) {
        reader::leaf(state, AstNodeKind::Identifier, TokenKind::Identifier)?;
    }
    reader::leaf(state, AstNodeKind::Constant, TokenKind::Semicolon)?;

    while at_section_member(state) {
        read_section_member(state)?;
    }
    Ok(state.end_context(id))
}

fn at_section_member(state: &ParseState) -> bool {
    reader::at(state, TokenKind::Identifier)
        || reader::at(state, TokenKind::KeywordShared)
        || reader::is_attribute_record_ahead(state, &[TokenKind::KeywordShared, TokenKind::Identifier])
}

fn read_section_member(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::SectionMember);
    if reader::is_attribute_record_ahead(state, &[TokenKind::KeywordShared, TokenKind::Identifier]) {
        reader::read_attribute_record(state)?;
    }
    if reader::at(state, TokenKind::KeywordShared) {
        reader::leaf(state, AstNodeKind::Constant, TokenKind::KeywordShared)?;
    }
    reader::leaf(state, AstNodeKind::Identifier, TokenKind::Identifier)?;
    reader::leaf(state, AstNodeKind::Constant, TokenKind::Equal)?;
    reader::read_expression(state)?;
    reader::leaf(state, AstNodeKind::Constant, TokenKind::Semicolon)?;
    Ok(state.end_context(id))
}
