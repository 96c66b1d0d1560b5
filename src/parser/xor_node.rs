//! §3 "XorNode", §9 design note: a single polymorphic reference so the
//! inspection layer never branches on which map owns a node.

use crate::ast::AstNodeKind;

use super::node_id_map::NodeIdMapCollection;

/// Polymorphic over `{ast, context}`. Resolution always goes back through
/// [`NodeIdMapCollection`]; this type carries no borrowed data of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XorNode {
    Ast(u32),
    Context(u32),
}

impl XorNode {
    pub fn id(self) -> u32 {
        match self {
            XorNode::Ast(id) | XorNode::Context(id) => id,
        }
    }

    pub fn is_context(self) -> bool {
        matches!(self, XorNode::Context(_))
    }

    pub fn kind(self, map: &NodeIdMapCollection) -> Option<AstNodeKind> {
        map.kind_of(self.id())
    }

    /// Resolves `id` against the map, choosing the `Ast` variant when the
    /// node is complete and falling back to `Context` for an in-progress
    /// one. Returns `None` if `id` is in neither map (I1 violated).
    pub fn resolve(map: &NodeIdMapCollection, id: u32) -> Option<XorNode> {
        if map.ast_node_by_id.contains_key(&id) {
            Some(XorNode::Ast(id))
        } else if map.context_node_by_id.contains_key(&id) {
            Some(XorNode::Context(id))
        } else {
            None
        }
    }

    pub fn token_index_start(self, map: &NodeIdMapCollection) -> Option<u32> {
        match self {
            XorNode::Ast(id) => map.ast_node_by_id.get(&id).map(|n| n.token_index_start),
            XorNode::Context(id) => map.context_node_by_id.get(&id).map(|n| n.token_index_start),
        }
    }

    pub fn token_index_end(self, map: &NodeIdMapCollection) -> Option<u32> {
        match self {
            XorNode::Ast(id) => map.ast_node_by_id.get(&id).map(|n| n.token_index_end),
            XorNode::Context(_) => None,
        }
    }
}
