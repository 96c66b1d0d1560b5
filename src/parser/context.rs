//! Module E: the parse context (§4.3). Mutated cooperatively by the reader
//! through a narrow set of operations; on error the context is left exactly
//! as it stood so the partial tree survives for inspection (§9).

use triomphe::Arc;

use crate::ast::{Ast, AstNodeKind};
use crate::lexer::{Token, TokenKind};
use crate::snapshot::Snapshot;

use super::node_id_map::{ContextNode, NodeIdMapCollection};
use super::reader::ParserKind;
use super::xor_node::XorNode;

/// Everything a reader threads through a parse: the snapshot being read,
/// the in-progress/completed node maps, the monotonic id counter (§9
/// "shared mutable id counter"), and the current read position.
#[derive(Debug, Clone)]
pub struct ParseState {
    pub snapshot: Arc<Snapshot>,
    pub node_id_map: NodeIdMapCollection,
    pub id_counter: u32,
    pub token_index: u32,
    pub parser_kind: ParserKind,
    context_stack: Vec<u32>,
}

impl ParseState {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self::with_parser_kind(snapshot, ParserKind::default())
    }

    pub fn with_parser_kind(snapshot: Arc<Snapshot>, parser_kind: ParserKind) -> Self {
        Self {
            snapshot,
            node_id_map: NodeIdMapCollection::new(),
            id_counter: 0,
            token_index: 0,
            parser_kind,
            context_stack: Vec::new(),
        }
    }

    /// Pushes a new in-progress node and makes it current. The id is
    /// monotonically increasing and never reused, even across
    /// `delete_context` (§9).
    pub fn start_context(&mut self, kind: AstNodeKind) -> u32 {
        let id = self.id_counter;
        self.id_counter += 1;

        let parent_id = self.context_stack.last().copied();
        let node = ContextNode {
            id,
            kind,
            token_index_start: self.token_index,
            parent_id,
            attribute_counter: 0,
        };
        self.node_id_map.context_node_by_id.insert(id, node);
        if let Some(parent) = parent_id {
            self.node_id_map.link(parent, id);
        }
        self.context_stack.push(id);
        id
    }

    /// Moves `id` from `contextNodeById` to `astNodeById`, finalizing its
    /// token interval and leaf status from the children already linked
    /// under it (I6).
    pub fn end_context(&mut self, id: u32) -> XorNode {
        debug_assert_eq!(self.context_stack.last().copied(), Some(id));
        self.context_stack.pop();

        let node = self
            .node_id_map
            .context_node_by_id
            .remove(&id)
            .expect("end_context called on an id that is not an open context");

        let is_leaf = self.node_id_map.children_of(id).is_empty();
        let ast = Ast::new(id, node.kind, node.token_index_start, self.token_index, is_leaf, node.parent_id);
        self.node_id_map.index_kind(id, node.kind);
        if is_leaf {
            self.node_id_map.leaf_ids.insert(id);
        }
        self.node_id_map.ast_node_by_id.insert(id, ast);
        XorNode::Ast(id)
    }

    /// Abandons a speculative read: `id` and every descendant are erased
    /// from the id map and the free list is implicit (ids are never
    /// reused), preserving (I3).
    pub fn delete_context(&mut self, id: u32) {
        if self.context_stack.last().copied() == Some(id) {
            self.context_stack.pop();
        }

        let children = self.node_id_map.child_ids_by_id.remove(&id).unwrap_or_default();
        for child in children {
            self.delete_context(child);
        }

        if let Some(parent) = self.node_id_map.parent_id_by_id.remove(&id) {
            if let Some(siblings) = self.node_id_map.child_ids_by_id.get_mut(&parent) {
                siblings.retain(|&c| c != id);
            }
        }
        if let Some(node) = self.node_id_map.context_node_by_id.remove(&id) {
            self.node_id_map.ids_by_node_kind.entry(node.kind).or_default().remove(&id);
        }
        if let Some(node) = self.node_id_map.ast_node_by_id.remove(&id) {
            self.node_id_map.ids_by_node_kind.entry(node.kind).or_default().remove(&id);
        }
        self.node_id_map.leaf_ids.shift_remove(&id);
    }

    /// Retroactively re-parents `existing` under a brand-new context node
    /// of `new_kind`, splicing it into the same slot `existing` occupied
    /// under its old parent (if any), then pushes the new context so the
    /// reader's next `start_context`/`leaf` calls attach under it. Used by
    /// the operator-precedence chain and the recursive-suffix loop to wrap
    /// an already-produced node once an operator or suffix token is seen,
    /// mirroring a checkpoint-and-wrap over a node that was parsed before
    /// its final parent was known to exist (§9).
    pub fn wrap_as_new_parent(&mut self, existing: XorNode, new_kind: AstNodeKind, token_index_start: u32) -> u32 {
        let existing_id = existing.id();
        let old_parent = self.node_id_map.parent_id_by_id.get(&existing_id).copied();

        let new_id = self.id_counter;
        self.id_counter += 1;

        if let Some(parent) = old_parent {
            if let Some(siblings) = self.node_id_map.child_ids_by_id.get_mut(&parent) {
                if let Some(slot) = siblings.iter().position(|&c| c == existing_id) {
                    siblings[slot] = new_id;
                }
            }
            self.node_id_map.parent_id_by_id.insert(new_id, parent);
        }

        self.node_id_map.parent_id_by_id.insert(existing_id, new_id);
        self.node_id_map.child_ids_by_id.insert(new_id, vec![existing_id]);

        if let Some(ast) = self.node_id_map.ast_node_by_id.get_mut(&existing_id) {
            ast.parent_id = Some(new_id);
        }

        self.node_id_map.context_node_by_id.insert(
            new_id,
            ContextNode {
                id: new_id,
                kind: new_kind,
                token_index_start,
                parent_id: old_parent,
                attribute_counter: 1,
            },
        );
        self.context_stack.push(new_id);
        new_id
    }

    /// Like [`Self::start_context`], but anchored at `token_index_start`
    /// rather than the current read position. Used for a node with no
    /// tokens of its own that still needs an in-bounds token index to
    /// resolve against (e.g. the still-untyped slot after a trailing
    /// comma, anchored at the comma rather than at end-of-stream).
    pub fn start_context_at(&mut self, kind: AstNodeKind, token_index_start: u32) -> u32 {
        let id = self.id_counter;
        self.id_counter += 1;

        let parent_id = self.context_stack.last().copied();
        let node = ContextNode { id, kind, token_index_start, parent_id, attribute_counter: 0 };
        self.node_id_map.context_node_by_id.insert(id, node);
        if let Some(parent) = parent_id {
            self.node_id_map.link(parent, id);
        }
        self.context_stack.push(id);
        id
    }

    pub fn current_context(&self) -> Option<u32> {
        self.context_stack.last().copied()
    }

    pub fn increment_attribute_counter(&mut self) {
        if let Some(&id) = self.context_stack.last() {
            if let Some(node) = self.node_id_map.context_node_by_id.get_mut(&id) {
                node.attribute_counter += 1;
            }
        }
    }

    pub fn peek_token(&self, n: u32) -> Option<&Token> {
        self.snapshot.tokens().get((self.token_index + n) as usize)
    }

    pub fn peek_token_kind(&self, n: u32) -> Option<TokenKind> {
        self.peek_token(n).map(|t| t.kind)
    }

    /// Consumes and returns the current token, advancing the read position.
    /// Returns `None` at end-of-stream without advancing.
    pub fn read_token(&mut self) -> Option<Token> {
        let token = self.snapshot.tokens().get(self.token_index as usize)?.clone();
        self.token_index += 1;
        Some(token)
    }

    pub fn at_eof(&self) -> bool {
        self.token_index as usize >= self.snapshot.tokens().len()
    }
}
