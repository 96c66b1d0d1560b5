//! Module F: the reader interface (§4.4, §9). Grammar rules that are not
//! about binary-operator precedence live here and are shared by both
//! reading strategies; [`super::recursive_descent`] and [`super::combinator`]
//! each supply their own `read_operator_expression` and are plugged in
//! through [`ParserKind`].

use crate::ast::AstNodeKind;
use crate::common::cancellation::CancellationToken;
use crate::lexer::TokenKind;

use super::context::ParseState;
use super::error::{CsvContinuationKind, ParseError, ParseErrorKind};
use super::xor_node::XorNode;

/// Which reading strategy to use (§6 Settings: `parser`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserKind {
    #[default]
    RecursiveDescent,
    Combinatorial,
}

pub(crate) fn err<T>(state: &ParseState, kind: ParseErrorKind) -> Result<T, ParseError> {
    Err(ParseError::new(kind, state.clone()))
}

pub(crate) fn check_cancellation(
    state: &ParseState,
    token: &dyn CancellationToken,
) -> Result<(), ParseError> {
    if token.is_cancelled() {
        return err(state, ParseErrorKind::Cancellation);
    }
    Ok(())
}

/// Consumes the current token if it is `expected`, wrapping it as a leaf
/// node of `kind`. Otherwise records `ExpectedTokenKind` (§4.4).
pub(crate) fn leaf(state: &mut ParseState, kind: AstNodeKind, expected: TokenKind) -> Result<XorNode, ParseError> {
    if state.peek_token_kind(0) != Some(expected) {
        let actual = state.peek_token(0).cloned();
        return err(state, ParseErrorKind::ExpectedTokenKind { expected, actual });
    }
    state.increment_attribute_counter();
    let id = state.start_context(kind);
    state.read_token();
    Ok(state.end_context(id))
}

pub(crate) fn at(state: &ParseState, kind: TokenKind) -> bool {
    state.peek_token_kind(0) == Some(kind)
}

/// `generalizedIdentifier` (§3, §6 `ExpectedGeneralizedIdentifier`): unlike a
/// plain `identifier`, a generalized identifier may be spelled with any
/// keyword's literal text — record and type field names are allowed to
/// collide with reserved words (`[type = 1, section = 2]` is valid M).
pub(crate) fn read_generalized_identifier(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let accepts = matches!(state.peek_token_kind(0), Some(kind) if kind == TokenKind::Identifier || kind.is_keyword());
    if !accepts {
        let actual = state.peek_token(0).cloned();
        return err(state, ParseErrorKind::ExpectedGeneralizedIdentifier { actual });
    }
    state.increment_attribute_counter();
    let id = state.start_context(AstNodeKind::GeneralizedIdentifier);
    state.read_token();
    Ok(state.end_context(id))
}

/// The "primary-with-recursive-suffix" head of the operator chain and the
/// entry point into non-operator grammar forms (§4.4).
pub fn read_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    match state.peek_token_kind(0) {
        Some(TokenKind::KeywordEach) => read_each_expression(state),
        Some(TokenKind::KeywordLet) => read_let_expression(state),
        Some(TokenKind::KeywordIf) => read_if_expression(state),
        Some(TokenKind::KeywordTry) => read_error_handling_expression(state),
        Some(TokenKind::KeywordError) => read_error_raising_expression(state),
        Some(TokenKind::LeftParen) if is_function_expression_ahead(state) => read_function_expression(state),
        _ => super::operator_chain::read_operator_expression(state),
    }
}

/// Peeks past a balanced `(...)` to see whether `=>` follows,
/// disambiguating a function expression from a parenthesized one (§4.4). A
/// top-level comma before the close is conclusive on its own: a
/// parenthesized expression never holds more than one expression, so
/// `(x, ...` can only be a parameter list, closed or not yet.
fn is_function_expression_ahead(state: &ParseState) -> bool {
    let mut depth = 0i32;
    let mut n = 0u32;
    loop {
        match state.peek_token_kind(n) {
            Some(TokenKind::LeftParen) => depth += 1,
            Some(TokenKind::RightParen) => {
                depth -= 1;
                if depth == 0 {
                    return matches!(state.peek_token_kind(n + 1), Some(TokenKind::FatArrow));
                }
            }
            Some(TokenKind::Comma) if depth == 1 => return true,
            None => return false,
            _ => {}
        }
        n += 1;
        if n > 100_000 {
            return false;
        }
    }
}

pub fn read_each_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::EachExpression);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordEach)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

pub fn read_let_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::LetExpression);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordLet)?;

    let mut saw_binding = false;
    loop {
        if at(state, TokenKind::KeywordIn) {
            break;
        }
        read_identifier_paired_expression(state)?;
        saw_binding = true;
        if at(state, TokenKind::Comma) {
            leaf(state, AstNodeKind::Constant, TokenKind::Comma)?;
            continue;
        }
        break;
    }
    if !saw_binding && !at(state, TokenKind::KeywordIn) {
        return err(state, ParseErrorKind::ExpectedCsvContinuation { kind: CsvContinuationKind::LetExpression });
    }

    leaf(state, AstNodeKind::Constant, TokenKind::KeywordIn)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

fn read_identifier_paired_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::IdentifierPairedExpression);
    leaf(state, AstNodeKind::Identifier, TokenKind::Identifier)?;
    leaf(state, AstNodeKind::Constant, TokenKind::Equal)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

pub fn read_if_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::IfExpression);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordIf)?;
    read_expression(state)?;
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordThen)?;
    read_expression(state)?;
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordElse)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

pub fn read_error_raising_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::ErrorRaisingExpression);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordError)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

pub fn read_error_handling_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::ErrorHandlingExpression);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordTry)?;
    read_expression(state)?;
    if at(state, TokenKind::KeywordOtherwise) {
        let otherwise_id = state.start_context(AstNodeKind::OtherwiseExpression);
        leaf(state, AstNodeKind::Constant, TokenKind::KeywordOtherwise)?;
        read_expression(state)?;
        state.end_context(otherwise_id);
    }
    Ok(state.end_context(id))
}

pub fn read_function_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::FunctionExpression);
    read_parameter_list(state)?;
    if at(state, TokenKind::KeywordAs) {
        read_as_type(state)?;
    }
    leaf(state, AstNodeKind::Constant, TokenKind::FatArrow)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

fn read_as_type(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::AsType);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordAs)?;
    read_nullable_primitive_type(state)?;
    Ok(state.end_context(id))
}

fn read_nullable_primitive_type(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::NullablePrimitiveType);
    if at(state, TokenKind::KeywordNullable) {
        leaf(state, AstNodeKind::Constant, TokenKind::KeywordNullable)?;
    }
    leaf(state, AstNodeKind::PrimitiveType, TokenKind::Identifier)?;
    Ok(state.end_context(id))
}

fn read_parameter_list(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::ParameterList);
    leaf(state, AstNodeKind::Constant, TokenKind::LeftParen)?;

    let mut saw_optional = false;
    if !at(state, TokenKind::RightParen) {
        loop {
            let param_id = state.start_context(AstNodeKind::Parameter);
            let is_optional = at(state, TokenKind::KeywordOptional);
            if is_optional {
                leaf(state, AstNodeKind::Constant, TokenKind::KeywordOptional)?;
                saw_optional = true;
            } else if saw_optional {
                let token = state.peek_token(0).cloned();
                state.delete_context(param_id);
                return err(
                    state,
                    ParseErrorKind::RequiredParameterAfterOptional {
                        token: token.unwrap_or_else(|| crate::lexer::Token::new(
                            TokenKind::Eof,
                            String::new(),
                            crate::common::position::Position::ROOT,
                            crate::common::position::Position::ROOT,
                        )),
                    },
                );
            }
            leaf(state, AstNodeKind::Identifier, TokenKind::Identifier)?;
            if at(state, TokenKind::KeywordAs) {
                read_as_type(state)?;
            }
            state.end_context(param_id);

            if at(state, TokenKind::Comma) {
                leaf(state, AstNodeKind::Constant, TokenKind::Comma)?;
                if at(state, TokenKind::RightParen) {
                    return err(state, ParseErrorKind::ExpectedCsvContinuation { kind: CsvContinuationKind::DanglingComma });
                }
                continue;
            }
            break;
        }
    }

    leaf(state, AstNodeKind::Constant, TokenKind::RightParen)?;
    Ok(state.end_context(id))
}

/// Generic comma-separated list reader shared by list/record
/// literals/expressions, parenthesized argument lists, and type forms
/// (§4.4 "dangling commas"). Wraps the whole list in a `CsvArray`, each
/// item plus its trailing comma (if any) in a `Csv`, so inspection (module
/// H) can count argument/field slots by child position.
pub(crate) fn read_csv(
    state: &mut ParseState,
    closing: TokenKind,
    mut item: impl FnMut(&mut ParseState) -> Result<XorNode, ParseError>,
) -> Result<XorNode, ParseError> {
    let array_id = state.start_context(AstNodeKind::CsvArray);
    if !at(state, closing) {
        loop {
            let csv_id = state.start_context(AstNodeKind::Csv);
            item(state)?;
            if at(state, TokenKind::Comma) {
                leaf(state, AstNodeKind::Constant, TokenKind::Comma)?;
                state.end_context(csv_id);
                if at(state, closing) {
                    return err(state, ParseErrorKind::ExpectedCsvContinuation { kind: CsvContinuationKind::DanglingComma });
                }
                if state.at_eof() {
                    // Still being typed: a trailing comma with nothing left
                    // to read is a real, empty slot (§4.6 "a trailing empty
                    // slot after a comma counts"), not grounds to open
                    // another `Csv` doomed to fail inside `item` with no
                    // children of its own. Anchor it at the comma already
                    // read so active-node resolution, which indexes
                    // `tokens[token_index_start]` directly, has a real
                    // token to point at.
                    let anchor = state.token_index.saturating_sub(1);
                    let empty_id = state.start_context_at(AstNodeKind::Csv, anchor);
                    state.end_context(empty_id);
                    break;
                }
                continue;
            }
            state.end_context(csv_id);
            break;
        }
    }
    Ok(state.end_context(array_id))
}

/// §4.4 primary expression plus its recursive suffix loop: `invoke`,
/// `item-access`, `field-selection`, `field-projection` attach
/// right-nested in left-to-right order.
pub fn read_primary_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let mut head = read_primary_head(state)?;
    loop {
        head = match state.peek_token_kind(0) {
            Some(TokenKind::LeftParen) => read_invoke_suffix(state, head)?,
            Some(TokenKind::LeftBrace) => read_item_access_suffix(state, head)?,
            Some(TokenKind::LeftBracket) => read_field_suffix(state, head)?,
            _ => break,
        };
    }
    Ok(head)
}

fn read_primary_head(state: &mut ParseState) -> Result<XorNode, ParseError> {
    match state.peek_token_kind(0) {
        Some(TokenKind::LeftParen) => read_parenthesized_expression(state),
        Some(TokenKind::LeftBrace) => read_list_expression(state),
        Some(TokenKind::LeftBracket) => read_record_expression(state),
        Some(TokenKind::Identifier) => read_identifier_expression(state),
        Some(TokenKind::KeywordType) => read_type_primary_type(state),
        Some(TokenKind::Numeric)
        | Some(TokenKind::Hex)
        | Some(TokenKind::TextLiteral)
        | Some(TokenKind::NullLiteral)
        | Some(TokenKind::KeywordTrue)
        | Some(TokenKind::KeywordFalse)
        | Some(TokenKind::KeywordHashInfinity)
        | Some(TokenKind::KeywordHashNan) => read_literal(state),
        Some(TokenKind::DotDotDot) => {
            let id = state.start_context(AstNodeKind::NotImplementedExpression);
            leaf(state, AstNodeKind::Constant, TokenKind::DotDotDot)?;
            Ok(state.end_context(id))
        }
        // `#date`, `#table`, … are keyword-shaped constants used as the head
        // of an invocation (`#date(2024, 1, 1)`), never as bare values on
        // their own — they carry no suffix-less meaning, so they are a
        // `Constant` rather than a `Literal` (§3 "Token kind").
        Some(TokenKind::KeywordHashBinary)
        | Some(TokenKind::KeywordHashDate)
        | Some(TokenKind::KeywordHashDateTime)
        | Some(TokenKind::KeywordHashDateTimeZone)
        | Some(TokenKind::KeywordHashDuration)
        | Some(TokenKind::KeywordHashSections)
        | Some(TokenKind::KeywordHashShared)
        | Some(TokenKind::KeywordHashTable)
        | Some(TokenKind::KeywordHashTime) => {
            let id = state.start_context(AstNodeKind::Constant);
            state.read_token();
            Ok(state.end_context(id))
        }
        other => err(
            state,
            ParseErrorKind::ExpectedAnyTokenKind {
                expected: vec![TokenKind::Identifier, TokenKind::LeftParen, TokenKind::LeftBrace, TokenKind::LeftBracket],
                actual: other.and(state.peek_token(0).cloned()),
            },
        ),
    }
}

/// `literal` (§4.4, §6 `InvalidLiteralError`): the restricted value form a
/// record-literal's key-value pairs accept, where only a bare literal token
/// (not a full expression) is allowed.
fn read_literal(state: &mut ParseState) -> Result<XorNode, ParseError> {
    match state.peek_token_kind(0) {
        Some(TokenKind::Numeric)
        | Some(TokenKind::Hex)
        | Some(TokenKind::TextLiteral)
        | Some(TokenKind::NullLiteral)
        | Some(TokenKind::KeywordTrue)
        | Some(TokenKind::KeywordFalse)
        | Some(TokenKind::KeywordHashInfinity)
        | Some(TokenKind::KeywordHashNan) => {
            let id = state.start_context(AstNodeKind::Literal);
            state.read_token();
            Ok(state.end_context(id))
        }
        _ => err(state, ParseErrorKind::InvalidLiteral { actual: state.peek_token(0).cloned() }),
    }
}

/// Peeks past a balanced `[...]` to see whether one of `next_kinds` follows
/// the close, disambiguating a leading attribute record from the document's
/// or section member's own expression/identifier (§4.4 "record-literal in
/// section context").
pub(crate) fn is_attribute_record_ahead(state: &ParseState, next_kinds: &[TokenKind]) -> bool {
    if !at(state, TokenKind::LeftBracket) {
        return false;
    }
    let mut depth = 0i32;
    let mut n = 0u32;
    loop {
        match state.peek_token_kind(n) {
            Some(TokenKind::LeftBracket) => depth += 1,
            Some(TokenKind::RightBracket) => {
                depth -= 1;
                if depth == 0 {
                    return matches!(state.peek_token_kind(n + 1), Some(kind) if next_kinds.contains(&kind));
                }
            }
            None => return false,
            _ => {}
        }
        n += 1;
        if n > 100_000 {
            return false;
        }
    }
}

/// `[` attribute record ahead of `section` or a section member: written
/// like a record expression, but each value is a restricted `literal`
/// rather than a full expression (§4.4).
pub(crate) fn read_attribute_record(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::RecordExpression);
    let opening = state.peek_token(0).cloned();
    leaf(state, AstNodeKind::Constant, TokenKind::LeftBracket)?;
    read_csv(state, TokenKind::RightBracket, |s| read_record_literal_paired_expression(s))?;
    if !at(state, TokenKind::RightBracket) {
        return err(state, ParseErrorKind::UnterminatedBracket { opening: opening.expect("checked by caller") });
    }
    leaf(state, AstNodeKind::Constant, TokenKind::RightBracket)?;
    Ok(state.end_context(id))
}

fn read_record_literal_paired_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::GeneralizedIdentifierPairedExpression);
    read_generalized_identifier(state)?;
    leaf(state, AstNodeKind::Constant, TokenKind::Equal)?;
    read_literal(state)?;
    Ok(state.end_context(id))
}

fn read_identifier_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::IdentifierExpression);
    leaf(state, AstNodeKind::Identifier, TokenKind::Identifier)?;
    Ok(state.end_context(id))
}

fn read_parenthesized_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::ParenthesizedExpression);
    let opening = state.peek_token(0).cloned();
    leaf(state, AstNodeKind::Constant, TokenKind::LeftParen)?;
    read_expression(state)?;
    if !at(state, TokenKind::RightParen) {
        return err(
            state,
            ParseErrorKind::UnterminatedParenthesis { opening: opening.expect("checked by caller") },
        );
    }
    leaf(state, AstNodeKind::Constant, TokenKind::RightParen)?;
    Ok(state.end_context(id))
}

fn read_list_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::ListExpression);
    let opening = state.peek_token(0).cloned();
    leaf(state, AstNodeKind::Constant, TokenKind::LeftBrace)?;
    read_csv(state, TokenKind::RightBrace, |s| read_expression(s))?;
    if !at(state, TokenKind::RightBrace) {
        return err(state, ParseErrorKind::UnterminatedBracket { opening: opening.expect("checked by caller") });
    }
    leaf(state, AstNodeKind::Constant, TokenKind::RightBrace)?;
    Ok(state.end_context(id))
}

/// `[` disambiguation (§4.4): without a matching field-selector shape this
/// is a record expression; key-value pairs use `generalizedIdentifier =
/// expression`.
fn read_record_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::RecordExpression);
    let opening = state.peek_token(0).cloned();
    leaf(state, AstNodeKind::Constant, TokenKind::LeftBracket)?;
    read_csv(state, TokenKind::RightBracket, |s| read_generalized_identifier_paired_expression(s))?;
    if !at(state, TokenKind::RightBracket) {
        return err(state, ParseErrorKind::UnterminatedBracket { opening: opening.expect("checked by caller") });
    }
    leaf(state, AstNodeKind::Constant, TokenKind::RightBracket)?;
    Ok(state.end_context(id))
}

fn read_generalized_identifier_paired_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::GeneralizedIdentifierPairedExpression);
    read_generalized_identifier(state)?;
    leaf(state, AstNodeKind::Constant, TokenKind::Equal)?;
    read_expression(state)?;
    Ok(state.end_context(id))
}

fn read_invoke_suffix(state: &mut ParseState, head: XorNode) -> Result<XorNode, ParseError> {
    let start = head.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
    let wrap_id = state.wrap_as_new_parent(head, AstNodeKind::InvokeExpression, start);
    let opening = state.peek_token(0).cloned();
    leaf(state, AstNodeKind::Constant, TokenKind::LeftParen)?;
    read_csv(state, TokenKind::RightParen, |s| read_expression(s))?;
    if !at(state, TokenKind::RightParen) {
        return err(state, ParseErrorKind::UnterminatedParenthesis { opening: opening.expect("checked by caller") });
    }
    leaf(state, AstNodeKind::Constant, TokenKind::RightParen)?;
    Ok(state.end_context(wrap_id))
}

fn read_item_access_suffix(state: &mut ParseState, head: XorNode) -> Result<XorNode, ParseError> {
    let start = head.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
    let wrap_id = state.wrap_as_new_parent(head, AstNodeKind::ItemAccess, start);
    leaf(state, AstNodeKind::Constant, TokenKind::LeftBrace)?;
    read_expression(state)?;
    leaf(state, AstNodeKind::Constant, TokenKind::RightBrace)?;
    Ok(state.end_context(wrap_id))
}

/// `[` following a primary head is a field-selector (`x[a]`) unless it
/// contains an asterisk-only body, which makes it a field-projection
/// (`x[[a]]`/`x[[a],[b]]`) (§4.4).
fn read_field_suffix(state: &mut ParseState, head: XorNode) -> Result<XorNode, ParseError> {
    let is_projection = state.peek_token_kind(1) == Some(TokenKind::LeftBracket);
    let start = head.token_index_start(&state.node_id_map).unwrap_or(state.token_index);
    if is_projection {
        let wrap_id = state.wrap_as_new_parent(head, AstNodeKind::FieldProjection, start);
        leaf(state, AstNodeKind::Constant, TokenKind::LeftBracket)?;
        read_csv(state, TokenKind::RightBracket, |s| {
            let inner_id = s.start_context(AstNodeKind::FieldSelector);
            leaf(s, AstNodeKind::Constant, TokenKind::LeftBracket)?;
            read_generalized_identifier(s)?;
            leaf(s, AstNodeKind::Constant, TokenKind::RightBracket)?;
            Ok(s.end_context(inner_id))
        })?;
        leaf(state, AstNodeKind::Constant, TokenKind::RightBracket)?;
        Ok(state.end_context(wrap_id))
    } else {
        let wrap_id = state.wrap_as_new_parent(head, AstNodeKind::FieldSelector, start);
        leaf(state, AstNodeKind::Constant, TokenKind::LeftBracket)?;
        read_generalized_identifier(state)?;
        leaf(state, AstNodeKind::Constant, TokenKind::RightBracket)?;
        Ok(state.end_context(wrap_id))
    }
}

fn read_type_primary_type(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::TypePrimaryType);
    leaf(state, AstNodeKind::Constant, TokenKind::KeywordType)?;
    read_type_expression(state)?;
    Ok(state.end_context(id))
}

pub fn read_type_expression(state: &mut ParseState) -> Result<XorNode, ParseError> {
    match state.peek_token_kind(0) {
        Some(TokenKind::KeywordNullable) => {
            let id = state.start_context(AstNodeKind::NullableType);
            leaf(state, AstNodeKind::Constant, TokenKind::KeywordNullable)?;
            read_type_expression(state)?;
            Ok(state.end_context(id))
        }
        Some(TokenKind::LeftBracket) => {
            let id = state.start_context(AstNodeKind::RecordType);
            leaf(state, AstNodeKind::Constant, TokenKind::LeftBracket)?;
            read_csv(state, TokenKind::RightBracket, |s| read_field_specification(s))?;
            leaf(state, AstNodeKind::Constant, TokenKind::RightBracket)?;
            Ok(state.end_context(id))
        }
        Some(TokenKind::LeftBrace) => {
            let id = state.start_context(AstNodeKind::ListType);
            leaf(state, AstNodeKind::Constant, TokenKind::LeftBrace)?;
            read_type_expression(state)?;
            leaf(state, AstNodeKind::Constant, TokenKind::RightBrace)?;
            Ok(state.end_context(id))
        }
        Some(TokenKind::KeywordHashTable) => {
            let id = state.start_context(AstNodeKind::TableType);
            leaf(state, AstNodeKind::Constant, TokenKind::KeywordHashTable)?;
            read_type_expression(state)?;
            Ok(state.end_context(id))
        }
        Some(TokenKind::LeftParen) => {
            let id = state.start_context(AstNodeKind::FunctionType);
            read_parameter_list(state)?;
            leaf(state, AstNodeKind::Constant, TokenKind::FatArrow)?;
            read_type_expression(state)?;
            Ok(state.end_context(id))
        }
        Some(TokenKind::Identifier) => leaf(state, AstNodeKind::PrimitiveType, TokenKind::Identifier),
        other => err(
            state,
            ParseErrorKind::InvalidPrimitiveType { actual: other.and(state.peek_token(0).cloned()) },
        ),
    }
}

fn read_field_specification(state: &mut ParseState) -> Result<XorNode, ParseError> {
    let id = state.start_context(AstNodeKind::FieldSpecification);
    read_generalized_identifier(state)?;
    if at(state, TokenKind::Equal) {
        leaf(state, AstNodeKind::Constant, TokenKind::Equal)?;
        read_type_expression(state)?;
    }
    Ok(state.end_context(id))
}

#[cfg(test)]
mod tests {
    use triomphe::Arc;

    use crate::ast::AstNodeKind;
    use crate::lexer::lex_from_split;
    use crate::settings::Settings;
    use crate::snapshot::try_snapshot;

    fn parse_ok(text: &str) -> crate::parser::ParseOk {
        let lexer_state = lex_from_split(text, "\n");
        let snapshot = Arc::new(try_snapshot(&lexer_state).unwrap());
        crate::parser::try_parse(&Settings::default(), snapshot).unwrap()
    }

    /// Depth-first search for the first descendant (inclusive) of `kind`.
    fn find_descendant(node_id_map: &crate::parser::NodeIdMapCollection, root: u32, kind: AstNodeKind) -> Option<u32> {
        if node_id_map.kind_of(root) == Some(kind) {
            return Some(root);
        }
        node_id_map
            .children_of(root)
            .iter()
            .find_map(|&c| find_descendant(node_id_map, c, kind))
    }

    #[test]
    fn record_fields_are_wrapped_in_a_csv_array() {
        let ok = parse_ok("[a=1,b=2]");
        let array_id = find_descendant(&ok.node_id_map, ok.root.id(), AstNodeKind::CsvArray)
            .expect("record should have a CsvArray child");

        let csvs: Vec<u32> = ok
            .node_id_map
            .children_of(array_id)
            .iter()
            .copied()
            .filter(|&c| ok.node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
            .collect();
        assert_eq!(csvs.len(), 2);

        for &csv_id in &csvs {
            let pair_id = ok.node_id_map.children_of(csv_id).first().copied().expect("each Csv wraps one pair");
            assert_eq!(ok.node_id_map.kind_of(pair_id), Some(AstNodeKind::GeneralizedIdentifierPairedExpression));
        }
    }

    #[test]
    fn single_item_list_still_gets_a_csv_array() {
        let ok = parse_ok("{1}");
        let array_id = find_descendant(&ok.node_id_map, ok.root.id(), AstNodeKind::CsvArray)
            .expect("list should have a CsvArray child even with one item");
        let csvs: Vec<u32> = ok
            .node_id_map
            .children_of(array_id)
            .iter()
            .copied()
            .filter(|&c| ok.node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
            .collect();
        assert_eq!(csvs.len(), 1);
    }

    #[test]
    fn empty_list_still_produces_an_empty_csv_array() {
        let ok = parse_ok("{}");
        let array_id = find_descendant(&ok.node_id_map, ok.root.id(), AstNodeKind::CsvArray)
            .expect("list should have a CsvArray child even when empty");
        assert!(ok.node_id_map.children_of(array_id).is_empty());
    }

    fn parse_err(text: &str) -> crate::parser::ParseError {
        let lexer_state = lex_from_split(text, "\n");
        let snapshot = Arc::new(try_snapshot(&lexer_state).unwrap());
        crate::parser::try_parse(&Settings::default(), snapshot).unwrap_err()
    }

    #[test]
    fn attribute_record_before_section_is_a_record_expression() {
        let ok = parse_ok("[Documentation.Name=\"x\"] section foo;");
        let document_children = ok.node_id_map.children_of(ok.root.id());
        assert_eq!(ok.node_id_map.kind_of(document_children[0]), Some(AstNodeKind::RecordExpression));
        assert_eq!(ok.node_id_map.kind_of(document_children[1]), Some(AstNodeKind::Section));
    }

    #[test]
    fn attribute_record_before_section_member_is_a_record_expression() {
        let ok = parse_ok("section foo; [Documentation.Name=\"x\"] shared a = 1;");
        let section_id = find_descendant(&ok.node_id_map, ok.root.id(), AstNodeKind::Section).unwrap();
        let member_id = find_descendant(&ok.node_id_map, section_id, AstNodeKind::SectionMember).unwrap();
        let member_children = ok.node_id_map.children_of(member_id);
        assert_eq!(ok.node_id_map.kind_of(member_children[0]), Some(AstNodeKind::RecordExpression));
    }

    #[test]
    fn section_member_without_attribute_record_is_unaffected() {
        let ok = parse_ok("section foo; shared a = 1;");
        let section_id = find_descendant(&ok.node_id_map, ok.root.id(), AstNodeKind::Section).unwrap();
        let member_id = find_descendant(&ok.node_id_map, section_id, AstNodeKind::SectionMember).unwrap();
        let member_children = ok.node_id_map.children_of(member_id);
        assert_ne!(ok.node_id_map.kind_of(member_children[0]), Some(AstNodeKind::RecordExpression));
    }

    #[test]
    fn non_literal_value_in_attribute_record_is_an_invalid_literal_error() {
        let err = parse_err("[a=1+1] section foo;");
        assert!(matches!(err.kind, crate::parser::ParseErrorKind::InvalidLiteral { .. }));
    }

    #[test]
    fn trailing_comma_at_end_of_input_still_produces_a_reachable_csv() {
        let err = parse_err("foo(x,");
        assert!(matches!(err.kind, crate::parser::ParseErrorKind::UnterminatedParenthesis { .. }));

        // `read_document`'s own context (id 0) never reaches `end_context` on
        // this input, but its children are still linked, so the descendant
        // walk works the same as it would on a completed parse.
        let invoke_id =
            find_descendant(&err.state.node_id_map, 0, AstNodeKind::InvokeExpression).expect("invoke expression should have been started");
        let array_id = find_descendant(&err.state.node_id_map, invoke_id, AstNodeKind::CsvArray)
            .expect("invoke arguments should be a CsvArray");
        let csvs: Vec<u32> = err
            .state
            .node_id_map
            .children_of(array_id)
            .iter()
            .copied()
            .filter(|&c| err.state.node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
            .collect();
        assert_eq!(csvs.len(), 2, "the dangling comma's slot should count as a second, empty Csv");
        assert!(err.state.node_id_map.children_of(csvs[1]).is_empty());
    }
}
