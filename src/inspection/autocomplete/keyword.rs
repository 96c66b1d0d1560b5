//! §4.6 "Autocomplete keyword".

use crate::ast::AstNodeKind;
use crate::lexer::Token;
use crate::parser::NodeIdMapCollection;

use crate::inspection::active_node::ActiveNode;
use crate::inspection::{partial_prefix, token_text};

const EXPRESSION_STARTERS: &[&str] = &["each", "let", "if", "try", "error", "not", "type", "section"];
const BINARY_OPERATORS: &[&str] = &["and", "or", "as", "is", "meta"];

fn is_constant(node_id_map: &NodeIdMapCollection, tokens: &[Token], id: u32, literal: &str) -> bool {
    node_id_map.kind_of(id) == Some(AstNodeKind::Constant) && token_text(node_id_map, tokens, id) == Some(literal)
}

fn with_extra(base: &[&'static str], extra: &[&'static str]) -> Vec<&'static str> {
    base.iter().copied().chain(extra.iter().copied()).collect()
}

/// The contextually valid keyword set before prefix filtering (§4.6's
/// table, collapsed to the cases this parser can distinguish from the
/// ancestry alone).
fn contextual_keywords(active_node: &ActiveNode, node_id_map: &NodeIdMapCollection, tokens: &[Token]) -> Vec<&'static str> {
    for &node in &active_node.ancestry {
        match node.kind(node_id_map) {
            Some(AstNodeKind::IfExpression) => {
                let children = node_id_map.children_of(node.id());
                let has_then = children.iter().any(|&c| is_constant(node_id_map, tokens, c, "then"));
                let has_else = children.iter().any(|&c| is_constant(node_id_map, tokens, c, "else"));
                return if has_else {
                    vec![]
                } else if has_then {
                    vec!["else"]
                } else {
                    vec!["then"]
                };
            }
            Some(AstNodeKind::ErrorHandlingExpression) => {
                let has_otherwise = node_id_map
                    .children_of(node.id())
                    .iter()
                    .any(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::OtherwiseExpression));
                if !has_otherwise {
                    return with_extra(BINARY_OPERATORS, &["otherwise"]);
                }
            }
            Some(AstNodeKind::LetExpression) => {
                let has_in = node_id_map
                    .children_of(node.id())
                    .iter()
                    .any(|&c| is_constant(node_id_map, tokens, c, "in"));
                if !has_in {
                    return with_extra(BINARY_OPERATORS, &["in"]);
                }
            }
            Some(AstNodeKind::Document) => {
                let children = node_id_map.children_of(node.id());
                let has_attribute =
                    children.first().is_some_and(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::RecordExpression));
                if has_attribute && children.len() == 1 {
                    return vec!["section"];
                }
            }
            Some(AstNodeKind::SectionMember) => {
                let children = node_id_map.children_of(node.id());
                let has_attribute =
                    children.first().is_some_and(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::RecordExpression));
                if has_attribute && children.len() == 1 {
                    return vec!["shared"];
                }
            }
            Some(AstNodeKind::Section) => {
                return vec!["shared"];
            }
            Some(AstNodeKind::Parameter) => {
                let list_id = node_id_map.parent_of(node.id());
                let has_earlier_parameter = list_id.is_some_and(|list_id| {
                    node_id_map
                        .children_of(list_id)
                        .iter()
                        .take_while(|&&c| c != node.id())
                        .any(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Parameter))
                });
                if has_earlier_parameter {
                    return vec!["optional"];
                }
            }
            Some(AstNodeKind::ParameterList) => {
                let has_earlier_parameter =
                    node_id_map.children_of(node.id()).iter().any(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Parameter));
                if has_earlier_parameter {
                    return vec!["optional"];
                }
            }
            _ => {}
        }
    }

    if active_node.ancestry.len() <= 1 {
        return with_extra(EXPRESSION_STARTERS, &[]);
    }
    BINARY_OPERATORS.to_vec()
}

/// Composes the contextual set with prefix filtering: a partial reserved
/// word narrows the set, pure whitespace returns it whole (§4.6).
pub fn compute_keyword_autocomplete(
    active_node: &ActiveNode,
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
) -> Vec<&'static str> {
    let contextual = contextual_keywords(active_node, node_id_map, tokens);
    match partial_prefix(active_node, node_id_map, tokens) {
        Some(prefix) if !prefix.is_empty() => contextual.into_iter().filter(|kw| kw.starts_with(prefix)).collect(),
        _ => contextual,
    }
}
