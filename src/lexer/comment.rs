use crate::common::position::Position;

/// §3 "Comment": line (`//`-less in M, M uses `//` and `/* */`) or
/// multi-line; carries its own text and whether it spans more than one
/// source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    pub position_start: Position,
    pub position_end: Position,
    pub contains_newline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Multiline,
}
