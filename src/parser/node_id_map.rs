//! Module E: the node-id map (§3 "NodeIdMapCollection", invariants I1–I6).

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};

use crate::ast::{Ast, AstNodeKind};
use crate::common::error::{CommonError, InvariantKind};

/// An in-progress node: the same id space as [`Ast`], but possibly missing
/// children and its final token interval (§3 "ParseContext.Node").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextNode {
    pub id: u32,
    pub kind: AstNodeKind,
    pub token_index_start: u32,
    pub parent_id: Option<u32>,
    /// How many children this rule has committed to producing so far; used
    /// to report "which structural slot was expected" on error (§4.3).
    pub attribute_counter: u32,
}

/// The maps that together let any operation locate a node by id, its
/// parent, its ordered children, and its kind (§3).
#[derive(Debug, Clone, Default)]
pub struct NodeIdMapCollection {
    pub ast_node_by_id: HashMap<u32, Ast>,
    pub context_node_by_id: HashMap<u32, ContextNode>,
    pub child_ids_by_id: HashMap<u32, Vec<u32>>,
    pub parent_id_by_id: HashMap<u32, u32>,
    pub leaf_ids: IndexSet<u32>,
    pub ids_by_node_kind: IndexMap<AstNodeKind, HashSet<u32>>,
}

impl NodeIdMapCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// §3 (I1): every id is in exactly one of the two node maps.
    pub fn contains(&self, id: u32) -> bool {
        self.ast_node_by_id.contains_key(&id) || self.context_node_by_id.contains_key(&id)
    }

    pub fn kind_of(&self, id: u32) -> Option<AstNodeKind> {
        self.ast_node_by_id
            .get(&id)
            .map(|n| n.kind)
            .or_else(|| self.context_node_by_id.get(&id).map(|n| n.kind))
    }

    pub fn children_of(&self, id: u32) -> &[u32] {
        self.child_ids_by_id.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: u32) -> Option<u32> {
        self.parent_id_by_id.get(&id).copied()
    }

    /// Links `child` under `parent` in the next child-order slot, keeping
    /// `parent_id_by_id` the inverse of `child_ids_by_id` (I3).
    pub(crate) fn link(&mut self, parent: u32, child: u32) {
        self.child_ids_by_id.entry(parent).or_default().push(child);
        self.parent_id_by_id.insert(child, parent);
    }

    pub(crate) fn index_kind(&mut self, id: u32, kind: AstNodeKind) {
        self.ids_by_node_kind.entry(kind).or_default().insert(id);
    }

    /// Verifies I1-I6 (§3). Exposed for tests and for callers that want to
    /// assert internal consistency after a manual mutation; `try_parse`
    /// checks this itself under `debug_assertions`.
    pub fn check_invariants(&self) -> Result<(), CommonError> {
        // I1: an id belongs to exactly one of the two node maps.
        for &id in self.ast_node_by_id.keys() {
            if self.context_node_by_id.contains_key(&id) {
                return Err(CommonError::Invariant { kind: InvariantKind::NodeIdOwnership, node_id: id });
            }
        }

        // I2/I3: childIdsById and parentIdById are mutual inverses.
        for (&parent, children) in &self.child_ids_by_id {
            for &child in children {
                if self.parent_id_by_id.get(&child) != Some(&parent) {
                    return Err(CommonError::Invariant {
                        kind: InvariantKind::ParentChildMismatch,
                        node_id: child,
                    });
                }
            }
        }
        for (&child, &parent) in &self.parent_id_by_id {
            if !self.child_ids_by_id.get(&parent).is_some_and(|c| c.contains(&child)) {
                return Err(CommonError::Invariant {
                    kind: InvariantKind::ParentChildMismatch,
                    node_id: child,
                });
            }
        }

        // I4: every leaf id is a completed Ast node.
        for &id in self.leaf_ids.iter() {
            if !self.ast_node_by_id.contains_key(&id) {
                return Err(CommonError::Invariant {
                    kind: InvariantKind::LeafNotAst,
                    node_id: id,
                });
            }
        }

        // I5: idsByNodeKind agrees with the kind recorded on each completed node.
        for (&kind, ids) in &self.ids_by_node_kind {
            for &id in ids {
                if self.ast_node_by_id.get(&id).map(|n| n.kind) != Some(kind) {
                    return Err(CommonError::Invariant { kind: InvariantKind::NodeKindIndex, node_id: id });
                }
            }
        }
        for (&id, node) in &self.ast_node_by_id {
            if !self.ids_by_node_kind.get(&node.kind).is_some_and(|ids| ids.contains(&id)) {
                return Err(CommonError::Invariant { kind: InvariantKind::NodeKindIndex, node_id: id });
            }
        }

        // I6: a completed node's token interval nests every completed
        // child's interval (in-progress children are skipped: a context
        // still open when its parent is checked hasn't committed its
        // interval yet).
        for (&id, node) in &self.ast_node_by_id {
            for &child in self.children_of(id) {
                if let Some(child_node) = self.ast_node_by_id.get(&child) {
                    if child_node.token_index_start < node.token_index_start || child_node.token_index_end > node.token_index_end {
                        return Err(CommonError::Invariant {
                            kind: InvariantKind::TokenIntervalNesting,
                            node_id: child,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
