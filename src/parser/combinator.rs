//! The combinatorial reading strategy's operator chain (§4.4, §9): a
//! single precedence-climbing loop driven by a lookup table rather than
//! one function per level. Shares the unary/`as`-`is`/metadata/primary
//! forms with [`super::recursive_descent`] since those are not part of
//! the binary-operator chain itself.

use crate::ast::AstNodeKind;
use crate::lexer::TokenKind;

use super::context::ParseState;
use super::error::ParseError;
use super::reader::leaf;
use super::recursive_descent::read_unary_expression;
use super::xor_node::XorNode;

#[derive(Clone, Copy)]
struct OpInfo {
    precedence: u8,
    kind: AstNodeKind,
}

fn precedence_of(token: TokenKind) -> Option<OpInfo> {
    use AstNodeKind::*;
    use TokenKind::*;
    Some(match token {
        KeywordOr => OpInfo { precedence: 1, kind: LogicalOrExpression },
        KeywordAnd => OpInfo { precedence: 2, kind: LogicalAndExpression },
        Equal | NotEqual => OpInfo { precedence: 3, kind: EqualityExpression },
        LessThan | LessThanEqual | GreaterThan | GreaterThanEqual => OpInfo { precedence: 4, kind: RelationalExpression },
        Plus | Minus | Ampersand => OpInfo { precedence: 5, kind: ArithmeticExpression },
        Asterisk | Division => OpInfo { precedence: 6, kind: ArithmeticExpression },
        _ => return None,
    })
}

pub(crate) fn read_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let atom = read_unary_expression(state)?;
    climb(state, atom, 1)
}

/// Classic precedence climbing: repeatedly consume an operator at or above
/// `min_precedence`, recursing one level tighter for its right-hand side so
/// higher-precedence runs bind before being handed back to the caller.
fn climb(state: &mut ParseState, mut left: XorNode, min_precedence: u8) -> Result<XorNode, ParseError> {
    while let Some(info) = state.peek_token_kind(0).and_then(precedence_of) {
        if info.precedence < min_precedence {
            break;
        }
        let op = state.peek_token_kind(0).expect("checked by loop condition");
        let start = left.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
        let wrap_id = state.wrap_as_new_parent(left, info.kind, start);
        leaf(state, AstNodeKind::Constant, op)?;

        let mut right = read_unary_expression(state)?;
        while let Some(next_info) = state.peek_token_kind(0).and_then(precedence_of) {
            if next_info.precedence <= info.precedence {
                break;
            }
            right = climb(state, right, info.precedence + 1)?;
        }
        let _ = right;

        left = state.end_context(wrap_id);
    }
    Ok(left)
}
