//! Module H: invoke-argument position (§4.6 "Invoke information").

use crate::ast::AstNodeKind;
use crate::lexer::Token;
use crate::parser::NodeIdMapCollection;

use super::active_node::ActiveNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeInfo {
    pub name: Option<String>,
    pub num_arguments: u32,
    pub position_argument_index: Option<u32>,
}

fn token_text_of<'a>(node_id_map: &NodeIdMapCollection, tokens: &'a [Token], id: u32) -> Option<&'a str> {
    let ast = node_id_map.ast_node_by_id.get(&id)?;
    tokens.get(ast.token_index_start as usize).map(|t| t.text.as_str())
}

/// `None` if the ancestry contains no `InvokeExpression` at all.
pub fn compute_invoke(active_node: &ActiveNode, node_id_map: &NodeIdMapCollection, tokens: &[Token]) -> Option<InvokeInfo> {
    let depth = active_node
        .ancestry
        .iter()
        .position(|n| n.kind(node_id_map) == Some(AstNodeKind::InvokeExpression))?;
    let invoke_node = active_node.ancestry[depth];

    let children = node_id_map.children_of(invoke_node.id());
    let head_id = *children.first()?;

    let name = (node_id_map.kind_of(head_id) == Some(AstNodeKind::IdentifierExpression))
        .then(|| node_id_map.children_of(head_id).first().copied())
        .flatten()
        .and_then(|ident_id| token_text_of(node_id_map, tokens, ident_id))
        .map(str::to_string);

    // Arguments live two levels down: `InvokeExpression` -> `CsvArray` ->
    // one `Csv` per argument slot (plus its trailing comma, if any).
    let argument_csv_ids: Vec<u32> = children
        .iter()
        .copied()
        .find(|&child| node_id_map.kind_of(child) == Some(AstNodeKind::CsvArray))
        .map(|array_id| {
            node_id_map
                .children_of(array_id)
                .iter()
                .copied()
                .filter(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
                .collect()
        })
        .unwrap_or_default();

    // A trailing empty slot after a comma counts (its `Csv` context is
    // already open and linked even though its item hasn't been read yet);
    // a cursor inside the closing paren with no dangling comma doesn't.
    let position_argument_index = active_node.ancestry[..depth]
        .iter()
        .find(|n| n.kind(node_id_map) == Some(AstNodeKind::Csv))
        .and_then(|csv_node| argument_csv_ids.iter().position(|&c| c == csv_node.id()))
        .map(|i| i as u32);

    Some(InvokeInfo {
        name,
        num_arguments: argument_csv_ids.len() as u32,
        position_argument_index,
    })
}
