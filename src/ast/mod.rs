//! Module D: the AST node-kind taxonomy (§3 "Ast node").

mod kind;

pub use kind::AstNodeKind;

/// A completed AST node. Token indexes are snapshot-absolute and form a
/// half-open interval; `parent_id` is `None` only for the document root
/// (§3, §8 universally quantified invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub id: u32,
    pub kind: AstNodeKind,
    pub token_index_start: u32,
    pub token_index_end: u32,
    pub is_leaf: bool,
    pub parent_id: Option<u32>,
}

impl Ast {
    pub fn new(
        id: u32,
        kind: AstNodeKind,
        token_index_start: u32,
        token_index_end: u32,
        is_leaf: bool,
        parent_id: Option<u32>,
    ) -> Self {
        Self {
            id,
            kind,
            token_index_start,
            token_index_end,
            is_leaf,
            parent_id,
        }
    }
}
