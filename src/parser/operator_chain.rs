//! Dispatches the binary-operator portion of the expression grammar to
//! whichever reading strategy [`ParseState`] was built with (§9 "two
//! interchangeable readers sharing one interface").

use super::context::ParseState;
use super::error::ParseError;
use super::reader::ParserKind;
use super::xor_node::XorNode;

pub(crate) fn read_operator_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    match state.parser_kind {
        ParserKind::RecursiveDescent => super::recursive_descent::read_logical_or_expression(state),
        ParserKind::Combinatorial => super::combinator::read_expression(state),
    }
}
