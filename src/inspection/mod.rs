//! Modules G–H: active-node resolution and the inspection pipeline built
//! on it (§4.5, §4.6). Each sub-inspection is driven purely by the
//! [`ActiveNode`] ancestry; none of them touch the snapshot or id map
//! beyond read-only lookups.

pub mod active_node;
pub mod autocomplete;
pub mod invoke;
pub mod scope;

use triomphe::Arc;

use crate::common::error::CommonError;
use crate::lexer::Token;
use crate::parser::{NodeIdMapCollection, ParseOk, XorNode};
use crate::settings::Settings;
use crate::snapshot::Snapshot;

pub use active_node::{ActiveNode, PositionClassification};
pub use autocomplete::keyword::compute_keyword_autocomplete;
pub use autocomplete::language_constant::{compute_language_constant_autocomplete, LanguageConstant};
pub use autocomplete::primitive_type::compute_primitive_type_autocomplete;
pub use invoke::{compute_invoke, InvokeInfo};
pub use scope::{compute_scope, Scope};

/// §6 "Inspected": the composed result of module H.
#[derive(Debug, Clone)]
pub struct Inspected {
    pub scope: Scope,
    pub invoke: Option<InvokeInfo>,
    pub autocomplete_keyword: Vec<&'static str>,
    pub autocomplete_primitive_type: Vec<&'static str>,
    pub autocomplete_language_constant: Option<LanguageConstant>,
}

pub(crate) fn token_text<'a>(node_id_map: &NodeIdMapCollection, tokens: &'a [Token], id: u32) -> Option<&'a str> {
    let ast = node_id_map.ast_node_by_id.get(&id)?;
    tokens.get(ast.token_index_start as usize).map(|t| t.text.as_str())
}

/// The text of the leaf the cursor is resolved against, when it can
/// meaningfully act as a partial word being typed (i.e. the cursor isn't
/// sitting on pure leading whitespace before some other token).
pub(crate) fn partial_prefix<'a>(
    active_node: &ActiveNode,
    node_id_map: &NodeIdMapCollection,
    tokens: &'a [Token],
) -> Option<&'a str> {
    if matches!(active_node.classification, PositionClassification::OnLeadingWhitespace) {
        return None;
    }
    let leaf = active_node.deepest()?;

    // `OnTrailingWhitespace` means no later leaf made it into the tree, which
    // covers two different cases: the cursor sitting right after the anchor
    // itself (prefix is the anchor's own text, as usual), or a parse that
    // gave up mid-word with a leftover token the lexer produced but the
    // parser never attached to any node (e.g. the `o` of a half-typed
    // `otherwise`) — that leftover, if one exists, is the actual word being
    // typed and takes priority over the anchor.
    if active_node.classification == PositionClassification::OnTrailingWhitespace {
        let next = leaf.token_index_start(node_id_map).and_then(|i| tokens.get(i as usize + 1));
        if let Some(next) = next {
            return Some(next.text.as_str());
        }
        return token_text(node_id_map, tokens, leaf.id());
    }

    token_text(node_id_map, tokens, leaf.id())
}

/// Runs module H over an already-built [`ActiveNode`] (§4.6). Errors are
/// limited to internal invariant violations; a node missing from the map
/// is reported rather than silently skipped.
pub fn inspect(
    _settings: &Settings,
    active_node: &ActiveNode,
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
) -> Result<Inspected, CommonError> {
    let scope = compute_scope(active_node, node_id_map, tokens);
    let invoke = compute_invoke(active_node, node_id_map, tokens);
    let autocomplete_keyword = compute_keyword_autocomplete(active_node, node_id_map, tokens);
    let autocomplete_primitive_type = compute_primitive_type_autocomplete(active_node, node_id_map, tokens);
    let autocomplete_language_constant = compute_language_constant_autocomplete(active_node, node_id_map, tokens);

    Ok(Inspected {
        scope,
        invoke,
        autocomplete_keyword,
        autocomplete_primitive_type,
        autocomplete_language_constant,
    })
}

/// §6 "tryInspection": resolves the active node from `triedParse`'s id map
/// (even on a parse error, the partial map is usable) and runs module H.
pub fn try_inspection(
    settings: &Settings,
    tried_parse: &Result<ParseOk, crate::parser::ParseError>,
    snapshot: &Arc<Snapshot>,
    position: crate::common::position::Position,
) -> Result<Inspected, CommonError> {
    let (node_id_map, leaf_ids, root) = match tried_parse {
        Ok(ok) => (&ok.node_id_map, &ok.leaf_ids, ok.root),
        Err(err) => (
            &err.state.node_id_map,
            &err.state.node_id_map.leaf_ids,
            XorNode::resolve(&err.state.node_id_map, 0).unwrap_or(XorNode::Context(0)),
        ),
    };

    let active = active_node::find_active_node(position, node_id_map, leaf_ids, snapshot.tokens(), root);
    inspect(settings, &active, node_id_map, snapshot.tokens())
}
