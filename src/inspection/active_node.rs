//! Module G: given a position, find the deepest node containing it and the
//! ancestor chain back to the root (§4.5).

use indexmap::IndexSet;

use crate::common::position::Position;
use crate::lexer::Token;
use crate::parser::{NodeIdMapCollection, XorNode};

/// Where a position sits relative to the leaf it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionClassification {
    OnLeadingWhitespace,
    OnTokenStart,
    Inside,
    OnTokenEnd,
    OnTrailingWhitespace,
}

/// §3 "ActiveNode". `ancestry` is deepest-first, the leaf itself at index
/// 0 and the document root last. An out-of-bounds node still carries the
/// root alone so downstream inspection has something to walk (§4.5).
#[derive(Debug, Clone)]
pub struct ActiveNode {
    pub position_in_bounds: bool,
    pub ancestry: Vec<XorNode>,
    pub classification: PositionClassification,
}

impl ActiveNode {
    pub fn deepest(&self) -> Option<XorNode> {
        self.ancestry.first().copied()
    }

    pub fn contains_kind(&self, node_id_map: &NodeIdMapCollection, kind: crate::ast::AstNodeKind) -> bool {
        self.ancestry.iter().any(|n| n.kind(node_id_map) == Some(kind))
    }
}

fn classify_within(token: &Token, position: Position) -> PositionClassification {
    if position.code_unit == token.position_start.code_unit {
        PositionClassification::OnTokenStart
    } else if position.code_unit == token.position_end.code_unit {
        PositionClassification::OnTokenEnd
    } else if position.code_unit > token.position_start.code_unit && position.code_unit < token.position_end.code_unit {
        PositionClassification::Inside
    } else {
        PositionClassification::OnLeadingWhitespace
    }
}

/// §4.5's algorithm. `root` anchors the out-of-bounds case (an empty
/// document, or a position strictly before the first token).
pub fn find_active_node(
    position: Position,
    node_id_map: &NodeIdMapCollection,
    leaf_ids: &IndexSet<u32>,
    tokens: &[Token],
    root: XorNode,
) -> ActiveNode {
    if tokens.is_empty() || position.code_unit < tokens[0].position_start.code_unit {
        return ActiveNode {
            position_in_bounds: false,
            ancestry: vec![root],
            classification: PositionClassification::OnLeadingWhitespace,
        };
    }

    let mut leaves: Vec<(u32, u32)> = leaf_ids
        .iter()
        .filter_map(|&id| node_id_map.ast_node_by_id.get(&id).map(|n| (id, n.token_index_start)))
        .collect();
    leaves.sort_by_key(|&(_, token_index)| token_index);

    // First leaf whose token has not yet ended at `position`.
    let split = leaves.partition_point(|&(_, token_index)| {
        tokens[token_index as usize].position_end.code_unit <= position.code_unit
    });

    let (leaf_id, classification) = if split == 0 {
        let (id, token_index) = leaves[0];
        let token = &tokens[token_index as usize];
        let classification = if position.code_unit == token.position_start.code_unit {
            PositionClassification::OnTokenStart
        } else {
            PositionClassification::Inside
        };
        (id, classification)
    } else {
        let (anchor_id, anchor_token_index) = leaves[split - 1];
        let anchor_token = &tokens[anchor_token_index as usize];
        debug_assert!(anchor_token.position_end.code_unit <= position.code_unit);

        match leaves.get(split) {
            // Two tokens touch exactly at `position`: prefer the
            // preceding one (e.g. the cursor right before a closing
            // paren still belongs to the argument just typed).
            Some(&(_, next_token_index)) if tokens[next_token_index as usize].position_start.code_unit == position.code_unit => {
                if anchor_token.position_end.code_unit == position.code_unit {
                    (anchor_id, PositionClassification::OnTokenEnd)
                } else {
                    let (id, token_index) = leaves[split];
                    (id, classify_within(&tokens[token_index as usize], position))
                }
            }
            Some(&(id, token_index)) => (id, classify_within(&tokens[token_index as usize], position)),
            None => (anchor_id, PositionClassification::OnTrailingWhitespace),
        }
    };

    let mut ancestry = Vec::new();
    let mut current = Some(leaf_id);
    while let Some(id) = current {
        if let Some(node) = XorNode::resolve(node_id_map, id) {
            ancestry.push(node);
        }
        current = node_id_map.parent_of(id);
    }

    ActiveNode { position_in_bounds: true, ancestry, classification }
}
