//! §4.6 "Autocomplete primitive type": offered right after `as`/`is`/`type`,
//! anywhere a bare primitive-type name is the only thing grammatically
//! valid next.

use crate::ast::AstNodeKind;
use crate::lexer::{Token, PRIMITIVE_TYPE_NAMES};
use crate::parser::NodeIdMapCollection;

use crate::inspection::active_node::ActiveNode;
use crate::inspection::partial_prefix;

const PRIMITIVE_TYPE_ANCESTORS: &[AstNodeKind] = &[
    AstNodeKind::AsExpression,
    AstNodeKind::IsExpression,
    AstNodeKind::NullablePrimitiveType,
    AstNodeKind::TypePrimaryType,
    AstNodeKind::AsType,
    AstNodeKind::PrimitiveType,
];

pub fn compute_primitive_type_autocomplete(
    active_node: &ActiveNode,
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
) -> Vec<&'static str> {
    let in_primitive_type_slot = active_node
        .ancestry
        .iter()
        .any(|n| n.kind(node_id_map).is_some_and(|k| PRIMITIVE_TYPE_ANCESTORS.contains(&k)));
    if !in_primitive_type_slot {
        return Vec::new();
    }

    match partial_prefix(active_node, node_id_map, tokens) {
        Some(prefix) if !prefix.is_empty() => {
            PRIMITIVE_TYPE_NAMES.iter().copied().filter(|name| name.starts_with(prefix)).collect()
        }
        _ => PRIMITIVE_TYPE_NAMES.to_vec(),
    }
}
