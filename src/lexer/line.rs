use std::rc::Rc;

use crate::common::position::Position;

use super::comment::{Comment, CommentKind};
use super::cursor::Cursor;
use super::error::{ExpectedKind, LineLexError};
use super::keyword;
use super::mode::LineMode;
use super::token::Token;
use super::token_kind::TokenKind;

/// One token or comment produced on a single line, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    Token(Token),
    Comment(Comment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MultilineKind {
    String,
    QuotedIdentifier,
    Comment,
}

/// Recorded on the line where an unterminated multi-line construct began.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MultilineOpen {
    pub kind: MultilineKind,
    pub start_position: Position,
    /// The unclosed remainder of the line, including the opening delimiter.
    pub opening_fragment: String,
}

/// Recorded on the line where a multi-line construct that began on an
/// earlier line finally closes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MultilineClose {
    pub end_position: Position,
    /// The line's text up to and including the closing delimiter.
    pub closing_fragment: String,
}

/// §3 "LexerLine": one line's worth of lexer state. Lines are independent,
/// replaceable units — re-lexing one line never touches another unless its
/// entering mode would change (§4.1).
#[derive(Debug, Clone, PartialEq)]
pub struct LexerLine {
    pub text: Rc<str>,
    pub line_start: Position,
    pub items: Vec<LineItem>,
    pub mode_enter: LineMode,
    pub mode_leave: LineMode,
    pub error: Option<LineLexError>,
    pub(crate) multiline_open: Option<MultilineOpen>,
    pub(crate) multiline_close: Option<MultilineClose>,
}

impl LexerLine {
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.items.iter().filter_map(|item| match item {
            LineItem::Token(t) => Some(t),
            LineItem::Comment(_) => None,
        })
    }
}

/// Lexes one line's text in isolation, starting from `mode_enter` (§4.1).
pub(crate) fn lex_line(text: Rc<str>, line_start: Position, mode_enter: LineMode) -> LexerLine {
    let mut items = Vec::new();
    let mut error = None;
    let mut multiline_open = None;
    let mut multiline_close = None;
    let mut mode = mode_enter;

    let mut remaining: &str = &text;
    let mut code_unit_offset: u32 = 0;

    loop {
        match mode {
            LineMode::Normal => {
                if remaining.is_empty() {
                    break;
                }
                match read_normal_token(remaining) {
                    NormalRead::Item(item, consumed_units, consumed_bytes) => {
                        if let Some(item) = item {
                            let start = Position::new(
                                line_start.code_unit + code_unit_offset,
                                line_start.line_number,
                                code_unit_offset,
                            );
                            let end = Position::new(
                                line_start.code_unit + code_unit_offset + consumed_units,
                                line_start.line_number,
                                code_unit_offset + consumed_units,
                            );
                            items.push(with_positions(item, start, end));
                        }
                        code_unit_offset += consumed_units;
                        remaining = &remaining[consumed_bytes..];
                    }
                    NormalRead::OpensMultiline { kind, consumed_bytes } => {
                        let start_position = Position::new(
                            line_start.code_unit + code_unit_offset,
                            line_start.line_number,
                            code_unit_offset,
                        );
                        multiline_open = Some(MultilineOpen {
                            kind,
                            start_position,
                            opening_fragment: remaining.to_string(),
                        });
                        mode = match kind {
                            MultilineKind::String => LineMode::InsideString,
                            MultilineKind::QuotedIdentifier => LineMode::InsideQuotedIdentifier,
                            MultilineKind::Comment => LineMode::InsideMultilineComment,
                        };
                        let _ = consumed_bytes;
                        break;
                    }
                    NormalRead::Error(err) => {
                        let here = Position::new(
                            line_start.code_unit + code_unit_offset,
                            line_start.line_number,
                            code_unit_offset,
                        );
                        error = Some(patch_error_position(err, here));
                        break;
                    }
                }
            }
            LineMode::InsideString | LineMode::InsideQuotedIdentifier => {
                let quote_kind = if mode == LineMode::InsideString {
                    MultilineKind::String
                } else {
                    MultilineKind::QuotedIdentifier
                };
                match find_unescaped_quote(remaining) {
                    Some((close_byte_end, close_units)) => {
                        let closing_fragment = remaining[..close_byte_end].to_string();
                        code_unit_offset += close_units;
                        let end_position = Position::new(
                            line_start.code_unit + code_unit_offset,
                            line_start.line_number,
                            code_unit_offset,
                        );
                        multiline_close = Some(MultilineClose {
                            end_position,
                            closing_fragment,
                        });
                        remaining = &remaining[close_byte_end..];
                        mode = LineMode::Normal;
                    }
                    None => {
                        let _ = quote_kind;
                        break;
                    }
                }
            }
            LineMode::InsideMultilineComment => match remaining.find("*/") {
                Some(byte_idx) => {
                    let close_byte_end = byte_idx + 2;
                    let consumed_units = code_unit_len(&remaining[..close_byte_end]);
                    let closing_fragment = remaining[..close_byte_end].to_string();
                    code_unit_offset += consumed_units;
                    let end_position = Position::new(
                        line_start.code_unit + code_unit_offset,
                        line_start.line_number,
                        code_unit_offset,
                    );
                    multiline_close = Some(MultilineClose {
                        end_position,
                        closing_fragment,
                    });
                    remaining = &remaining[close_byte_end..];
                    mode = LineMode::Normal;
                }
                None => break,
            },
        }
    }

    LexerLine {
        text,
        line_start,
        items,
        mode_enter,
        mode_leave: mode,
        error,
        multiline_open,
        multiline_close,
    }
}

fn patch_error_position(err: LineLexError, position: Position) -> LineLexError {
    match err {
        LineLexError::Expected { kind, .. } => LineLexError::Expected { kind, position },
        LineLexError::UnexpectedRead(_) => LineLexError::UnexpectedRead(position),
        LineLexError::UnexpectedEof(_) => LineLexError::UnexpectedEof(position),
        LineLexError::UnterminatedMultilineToken { kind, .. } => {
            LineLexError::UnterminatedMultilineToken { kind, opening_position: position }
        }
    }
}

fn with_positions(item: LineItem, start: Position, end: Position) -> LineItem {
    match item {
        LineItem::Token(mut t) => {
            t.position_start = start;
            t.position_end = end;
            LineItem::Token(t)
        }
        LineItem::Comment(mut c) => {
            c.position_start = start;
            c.position_end = end;
            LineItem::Comment(c)
        }
    }
}

enum NormalRead {
    /// A fully-lexed item (or `None` for skipped whitespace), plus how many
    /// code units / bytes of `remaining` it consumed.
    Item(Option<LineItem>, u32, usize),
    OpensMultiline {
        kind: MultilineKind,
        consumed_bytes: usize,
    },
    Error(LineLexError),
}

fn code_unit_len(s: &str) -> u32 {
    crate::common::text::code_unit_len(s)
}

fn read_normal_token(remaining: &str) -> NormalRead {
    let mut cursor = Cursor::new(remaining);
    let first = match cursor.first() {
        Some(c) => c,
        None => return NormalRead::Item(None, 0, 0),
    };

    if is_whitespace(first) {
        while cursor.first().map(is_whitespace).unwrap_or(false) {
            cursor.bump();
        }
        return NormalRead::Item(None, cursor.len_consumed(), cursor.byte_len_consumed());
    }

    if first == '/' && cursor.second() == Some('/') {
        cursor.bump();
        cursor.bump();
        while let Some(c) = cursor.first() {
            cursor.bump();
            let _ = c;
        }
        let text = remaining[..cursor.byte_len_consumed()].to_string();
        let comment = LineItem::Comment(Comment {
            kind: CommentKind::Line,
            text,
            position_start: Position::ROOT,
            position_end: Position::ROOT,
            contains_newline: false,
        });
        return NormalRead::Item(Some(comment), cursor.len_consumed(), cursor.byte_len_consumed());
    }

    if first == '/' && cursor.second() == Some('*') {
        if let Some(byte_idx) = remaining.find("*/") {
            let end = byte_idx + 2;
            let text = remaining[..end].to_string();
            let units = code_unit_len(&text);
            let comment = LineItem::Comment(Comment {
                kind: CommentKind::Multiline,
                text,
                position_start: Position::ROOT,
                position_end: Position::ROOT,
                contains_newline: false,
            });
            return NormalRead::Item(Some(comment), units, end);
        }
        return NormalRead::OpensMultiline {
            kind: MultilineKind::Comment,
            consumed_bytes: remaining.len(),
        };
    }

    if first == '"' {
        if let Some((end, _)) = find_unescaped_quote(&remaining[1..]) {
            let end = end + 1;
            let text = remaining[..end].to_string();
            let units = code_unit_len(&text);
            let token = LineItem::Token(Token::new(TokenKind::TextLiteral, text, Position::ROOT, Position::ROOT));
            return NormalRead::Item(Some(token), units, end);
        }
        return NormalRead::OpensMultiline {
            kind: MultilineKind::String,
            consumed_bytes: remaining.len(),
        };
    }

    if first == '#' && cursor.second() == Some('"') {
        let tail = &remaining[1..];
        if let Some((end, _)) = find_unescaped_quote(&tail[1..]) {
            let end = 1 + end + 1;
            let text = remaining[..end].to_string();
            let units = code_unit_len(&text);
            let token = LineItem::Token(Token::new(TokenKind::QuotedIdentifier, text, Position::ROOT, Position::ROOT));
            return NormalRead::Item(Some(token), units, end);
        }
        return NormalRead::OpensMultiline {
            kind: MultilineKind::QuotedIdentifier,
            consumed_bytes: remaining.len(),
        };
    }

    if first == '#' && cursor.second().map(is_ident_start).unwrap_or(false) {
        let mut len_bytes = 1;
        let mut chars = remaining[1..].chars();
        while let Some(c) = chars.clone().next() {
            if is_ident_continue(c) {
                len_bytes += c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let text = &remaining[..len_bytes];
        return match keyword::lookup_hash_keyword(text) {
            Some(kind) => {
                let units = code_unit_len(text);
                let token = LineItem::Token(Token::new(kind, text.to_string(), Position::ROOT, Position::ROOT));
                NormalRead::Item(Some(token), units, len_bytes)
            }
            None => NormalRead::Error(LineLexError::UnexpectedRead(Position::ROOT)),
        };
    }

    if is_digit(first) {
        return read_number(remaining);
    }

    if is_ident_start(first) {
        let mut len_bytes = first.len_utf8();
        let mut chars = remaining[len_bytes..].chars();
        while let Some(c) = chars.clone().next() {
            if is_ident_continue(c) {
                len_bytes += c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let text = &remaining[..len_bytes];
        let units = code_unit_len(text);
        let kind = keyword::lookup(text).unwrap_or(TokenKind::Identifier);
        let token = LineItem::Token(Token::new(kind, text.to_string(), Position::ROOT, Position::ROOT));
        return NormalRead::Item(Some(token), units, len_bytes);
    }

    read_punctuator(remaining)
}

fn read_number(remaining: &str) -> NormalRead {
    if remaining.starts_with("0x") || remaining.starts_with("0X") {
        let mut len_bytes = 2;
        let mut chars = remaining[2..].chars();
        while let Some(c) = chars.clone().next() {
            if c.is_ascii_hexdigit() {
                len_bytes += c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        if len_bytes == 2 {
            return NormalRead::Error(LineLexError::Expected {
                kind: ExpectedKind::HexLiteral,
                position: Position::ROOT,
            });
        }
        let text = &remaining[..len_bytes];
        let units = code_unit_len(text);
        let token = LineItem::Token(Token::new(TokenKind::Hex, text.to_string(), Position::ROOT, Position::ROOT));
        return NormalRead::Item(Some(token), units, len_bytes);
    }

    let bytes = remaining.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    let text = &remaining[..i];
    let units = code_unit_len(text);
    let token = LineItem::Token(Token::new(TokenKind::Numeric, text.to_string(), Position::ROOT, Position::ROOT));
    NormalRead::Item(Some(token), units, i)
}

fn read_punctuator(remaining: &str) -> NormalRead {
    const THREE: &[(&str, TokenKind)] = &[("...", TokenKind::DotDotDot)];
    const TWO: &[(&str, TokenKind)] = &[
        ("=>", TokenKind::FatArrow),
        ("<=", TokenKind::LessThanEqual),
        (">=", TokenKind::GreaterThanEqual),
        ("<>", TokenKind::NotEqual),
        ("..", TokenKind::DotDot),
    ];
    const ONE: &[(char, TokenKind)] = &[
        ('(', TokenKind::LeftParen),
        (')', TokenKind::RightParen),
        ('[', TokenKind::LeftBracket),
        (']', TokenKind::RightBracket),
        ('{', TokenKind::LeftBrace),
        ('}', TokenKind::RightBrace),
        (',', TokenKind::Comma),
        (';', TokenKind::Semicolon),
        ('=', TokenKind::Equal),
        ('<', TokenKind::LessThan),
        ('>', TokenKind::GreaterThan),
        ('+', TokenKind::Plus),
        ('-', TokenKind::Minus),
        ('*', TokenKind::Asterisk),
        ('/', TokenKind::Division),
        ('&', TokenKind::Ampersand),
        ('@', TokenKind::At),
        ('?', TokenKind::Question),
        ('.', TokenKind::Dot),
    ];

    for (lit, kind) in THREE {
        if remaining.starts_with(lit) {
            return emit_punct(lit, *kind);
        }
    }
    for (lit, kind) in TWO {
        if remaining.starts_with(lit) {
            return emit_punct(lit, *kind);
        }
    }
    let first = remaining.chars().next().unwrap();
    for (ch, kind) in ONE {
        if *ch == first {
            let lit = &remaining[..first.len_utf8()];
            return emit_punct(lit, *kind);
        }
    }
    NormalRead::Error(LineLexError::UnexpectedRead(Position::ROOT))
}

fn emit_punct(lit: &str, kind: TokenKind) -> NormalRead {
    let units = code_unit_len(lit);
    let token = LineItem::Token(Token::new(kind, lit.to_string(), Position::ROOT, Position::ROOT));
    NormalRead::Item(Some(token), units, lit.len())
}

/// Finds an unescaped closing `"`, where `""` is the doubled-quote escape
/// (§4.1). Returns the byte length through (and including) the closer, and
/// the code units consumed.
fn find_unescaped_quote(s: &str) -> Option<(usize, u32)> {
    let mut units = 0u32;
    let mut chars = s.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == '"' {
            let mut lookahead = chars.clone();
            if let Some((_, '"')) = lookahead.next() {
                chars.next();
                units += 2;
                continue;
            }
            return Some((idx + 1, units + 1));
        }
        units += c.len_utf16() as u32;
    }
    None
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\u{000B}' | '\u{000C}')
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '.' || c.is_alphanumeric()
}
