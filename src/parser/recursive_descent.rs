//! The recursive-descent reading strategy's operator chain (§4.4): one
//! function per precedence level, ascending `logical-or` down to
//! `metadata`, each calling the next tighter level directly. This is the
//! default [`super::reader::ParserKind`].

use crate::ast::AstNodeKind;
use crate::lexer::TokenKind;

use super::context::ParseState;
use super::error::ParseError;
use super::reader::{at, leaf};
use super::xor_node::XorNode;

fn binary_level(
    state: &mut ParseState,
    next: fn(&mut ParseState) -> Result<XorNode, ParseError>,
    ops: &[TokenKind],
    wrap_kind: AstNodeKind,
) -> Result<XorNode, ParseError> {
    let mut left = next(state)?;
    while let Some(kind) = state.peek_token_kind(0) {
        if !ops.contains(&kind) {
            break;
        }
        let start = left.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
        let wrap_id = state.wrap_as_new_parent(left, wrap_kind, start);
        leaf(state, AstNodeKind::Constant, kind)?;
        next(state)?;
        left = state.end_context(wrap_id);
    }
    Ok(left)
}

pub(crate) fn read_logical_or_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    binary_level(state, read_logical_and_expression, &[TokenKind::KeywordOr], AstNodeKind::LogicalOrExpression)
}

fn read_logical_and_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    binary_level(state, read_equality_expression, &[TokenKind::KeywordAnd], AstNodeKind::LogicalAndExpression)
}

fn read_equality_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    binary_level(
        state,
        read_relational_expression,
        &[TokenKind::Equal, TokenKind::NotEqual],
        AstNodeKind::EqualityExpression,
    )
}

fn read_relational_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    binary_level(
        state,
        read_additive_expression,
        &[TokenKind::LessThan, TokenKind::LessThanEqual, TokenKind::GreaterThan, TokenKind::GreaterThanEqual],
        AstNodeKind::RelationalExpression,
    )
}

fn read_additive_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    binary_level(
        state,
        read_multiplicative_expression,
        &[TokenKind::Plus, TokenKind::Minus, TokenKind::Ampersand],
        AstNodeKind::ArithmeticExpression,
    )
}

fn read_multiplicative_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    binary_level(
        state,
        read_unary_expression,
        &[TokenKind::Asterisk, TokenKind::Division],
        AstNodeKind::ArithmeticExpression,
    )
}

/// Prefix `+`/`-`/`not`, recursing to allow chained unary operators before
/// falling through to `as`/`is` (§4.4).
pub(crate) fn read_unary_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    if matches!(state.peek_token_kind(0), Some(TokenKind::Plus) | Some(TokenKind::Minus) | Some(TokenKind::KeywordNot)) {
        let id = state.start_context(AstNodeKind::UnaryExpression);
        let op = state.peek_token_kind(0).expect("checked above");
        leaf(state, AstNodeKind::Constant, op)?;
        read_unary_expression(state)?;
        Ok(state.end_context(id))
    } else {
        read_as_is_expression(state)
    }
}

fn read_as_is_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let mut left = read_metadata_expression(state)?;
    loop {
        let (wrap_kind, op) = match state.peek_token_kind(0) {
            Some(TokenKind::KeywordAs) => (AstNodeKind::AsExpression, TokenKind::KeywordAs),
            Some(TokenKind::KeywordIs) => (AstNodeKind::IsExpression, TokenKind::KeywordIs),
            _ => break,
        };
        let start = left.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
        let wrap_id = state.wrap_as_new_parent(left, wrap_kind, start);
        leaf(state, AstNodeKind::Constant, op)?;
        super::reader::read_type_expression(state)?;
        left = state.end_context(wrap_id);
    }
    Ok(left)
}

fn read_metadata_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let mut left = super::reader::read_primary_expression(state)?;
    while at(state, TokenKind::KeywordMeta) {
        let start = left.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
        let wrap_id = state.wrap_as_new_parent(left, AstNodeKind::MetadataExpression, start);
        leaf(state, AstNodeKind::Constant, TokenKind::KeywordMeta)?;
        super::reader::read_primary_expression(state)?;
        left = state.end_context(wrap_id);
    }
    Ok(left)
}
