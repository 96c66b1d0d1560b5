//! Module C: collapsing a clean [`crate::lexer::LexerState`] into one flat
//! token/comment stream with absolute, snapshot-relative indexes (§4.2).

use std::collections::HashMap;

use crate::lexer::{Comment, CommentKind, LexError, LexerState, MultilineKind, Token, TokenKind};

/// An error-free, consolidated view of a [`LexerState`]: multi-line
/// strings, quoted identifiers and block comments are collapsed into a
/// single token or comment each, and every token carries a
/// snapshot-absolute index (§3 "Snapshot").
#[derive(Debug, Clone)]
pub struct Snapshot {
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    /// comment index → index of the token it trails (appeared on the same
    /// source line, before the next newline).
    trailing_of: HashMap<usize, u32>,
    /// comment index → index of the token it leads (the next token that
    /// follows it, when the comment sits on its own line(s)).
    leading_of: HashMap<usize, u32>,
}

impl Snapshot {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn trailing_comments(&self, token_index: u32) -> impl Iterator<Item = &Comment> + '_ {
        self.comments.iter().enumerate().filter_map(move |(i, c)| {
            (self.trailing_of.get(&i) == Some(&token_index)).then_some(c)
        })
    }

    pub fn leading_comments(&self, token_index: u32) -> impl Iterator<Item = &Comment> + '_ {
        self.comments.iter().enumerate().filter_map(move |(i, c)| {
            (self.leading_of.get(&i) == Some(&token_index)).then_some(c)
        })
    }
}

/// §4.1's `trySnapshot`: fails with the per-line error map if any line
/// failed to lex; otherwise flattens the state into a [`Snapshot`].
pub fn try_snapshot(state: &LexerState) -> Result<Snapshot, LexError> {
    let errors = state.error_line_map();
    if !errors.is_empty() {
        return Err(LexError::LineMap(errors));
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut comments: Vec<Comment> = Vec::new();
    let mut trailing_of = HashMap::new();
    let mut leading_of = HashMap::new();

    let mut line_idx = 0usize;
    while line_idx < state.lines.len() {
        let line = &state.lines[line_idx];

        for item in &line.items {
            match item {
                crate::lexer::LineItem::Token(t) => {
                    tokens.push(t.clone());
                }
                crate::lexer::LineItem::Comment(c) => {
                    let comment_idx = comments.len();
                    if !tokens.is_empty() && c.position_start.line_number == line.line_start.line_number
                        && tokens.last().map(|t| t.position_end.line_number) == Some(line.line_start.line_number)
                    {
                        trailing_of.insert(comment_idx, (tokens.len() - 1) as u32);
                    }
                    comments.push(c.clone());
                }
            }
        }

        if let Some(open) = &line.multiline_open {
            // Scan forward to the line that closes this construct, joining
            // each intervening line's raw text with the terminator.
            let mut joined = open.opening_fragment.clone();
            let mut end_idx = line_idx + 1;
            let mut end_position = open.start_position;
            while end_idx < state.lines.len() {
                joined.push_str(&state.line_terminator);
                let next = &state.lines[end_idx];
                if let Some(close) = &next.multiline_close {
                    joined.push_str(&close.closing_fragment);
                    end_position = close.end_position;
                    break;
                } else {
                    joined.push_str(&next.text);
                    end_idx += 1;
                }
            }

            match open.kind {
                MultilineKind::String => {
                    tokens.push(Token::new(TokenKind::TextLiteral, joined, open.start_position, end_position));
                }
                MultilineKind::QuotedIdentifier => {
                    tokens.push(Token::new(TokenKind::QuotedIdentifier, joined, open.start_position, end_position));
                }
                MultilineKind::Comment => {
                    comments.push(Comment {
                        kind: CommentKind::Multiline,
                        text: joined,
                        position_start: open.start_position,
                        position_end: end_position,
                        contains_newline: true,
                    });
                }
            }

            line_idx = end_idx + 1;
            continue;
        }

        line_idx += 1;
    }

    // Leading-comment association: any comment not claimed as trailing
    // leads the next token in document order.
    let mut next_token_after: Vec<u32> = vec![tokens.len() as u32; comments.len()];
    {
        let mut token_cursor = 0usize;
        for (i, c) in comments.iter().enumerate() {
            while token_cursor < tokens.len()
                && tokens[token_cursor].position_start.code_unit < c.position_start.code_unit
            {
                token_cursor += 1;
            }
            next_token_after[i] = token_cursor as u32;
        }
    }
    for (i, _) in comments.iter().enumerate() {
        if !trailing_of.contains_key(&i) && (next_token_after[i] as usize) < tokens.len() {
            leading_of.insert(i, next_token_after[i]);
        }
    }

    Ok(Snapshot {
        tokens,
        comments,
        trailing_of,
        leading_of,
    })
}
