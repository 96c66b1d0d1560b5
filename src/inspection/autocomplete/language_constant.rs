//! §4.6 "Autocomplete language constant": the two reserved words that sit
//! in front of a type or a parameter name rather than being full keywords
//! in their own right.

use crate::ast::AstNodeKind;
use crate::lexer::Token;
use crate::parser::NodeIdMapCollection;

use crate::inspection::active_node::ActiveNode;
use crate::inspection::partial_prefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageConstant {
    Nullable,
    Optional,
}

impl LanguageConstant {
    fn text(self) -> &'static str {
        match self {
            LanguageConstant::Nullable => "nullable",
            LanguageConstant::Optional => "optional",
        }
    }
}

fn matches_prefix(active_node: &ActiveNode, node_id_map: &NodeIdMapCollection, tokens: &[Token], constant: LanguageConstant) -> bool {
    match partial_prefix(active_node, node_id_map, tokens) {
        Some(prefix) if !prefix.is_empty() => constant.text().starts_with(prefix),
        _ => true,
    }
}

/// `nullable` is valid right where a primitive type is expected (`as`, `is`,
/// a type-annotation slot); `optional` is valid right where a parameter name
/// is expected, i.e. at the start of a `Parameter` (§4.6).
pub fn compute_language_constant_autocomplete(
    active_node: &ActiveNode,
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
) -> Option<LanguageConstant> {
    let in_type_slot = active_node.ancestry.iter().any(|n| {
        n.kind(node_id_map).is_some_and(|k| {
            matches!(
                k,
                AstNodeKind::AsExpression | AstNodeKind::AsType | AstNodeKind::NullablePrimitiveType | AstNodeKind::TypePrimaryType
            )
        })
    });
    if in_type_slot && matches_prefix(active_node, node_id_map, tokens, LanguageConstant::Nullable) {
        return Some(LanguageConstant::Nullable);
    }

    let in_parameter_slot = active_node
        .ancestry
        .iter()
        .any(|n| n.kind(node_id_map) == Some(AstNodeKind::Parameter));
    if in_parameter_slot && matches_prefix(active_node, node_id_map, tokens, LanguageConstant::Optional) {
        return Some(LanguageConstant::Optional);
    }

    None
}
