//! Module H: identifier scope (§4.6 "Scope"). An ordered list rather than a
//! map — sibling record fields that reuse a name are observable as distinct
//! entries in a fixed order, not deduplicated (§9 open question).

use crate::ast::AstNodeKind;
use crate::lexer::Token;
use crate::parser::{NodeIdMapCollection, XorNode};

use super::active_node::ActiveNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeItem {
    pub name: String,
    pub origin_node_id: u32,
}

/// Innermost-first, matching the order the ancestry is walked (§4.6).
#[derive(Debug, Clone, Default)]
pub struct Scope(pub Vec<ScopeItem>);

impl Scope {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|item| item.name.as_str())
    }
}

fn token_text<'a>(node_id_map: &NodeIdMapCollection, tokens: &'a [Token], id: u32) -> Option<&'a str> {
    let ast = node_id_map.ast_node_by_id.get(&id)?;
    tokens.get(ast.token_index_start as usize).map(|t| t.text.as_str())
}

fn identifier_text<'a>(node_id_map: &NodeIdMapCollection, tokens: &'a [Token], paired_expr_id: u32) -> Option<&'a str> {
    let child_id = *node_id_map.children_of(paired_expr_id).first()?;
    token_text(node_id_map, tokens, child_id)
}

/// Walks `active_node.ancestry` innermost-first, accumulating scope
/// contributions for each binder kind it passes through (§4.6).
pub fn compute_scope(active_node: &ActiveNode, node_id_map: &NodeIdMapCollection, tokens: &[Token]) -> Scope {
    let mut items = Vec::new();
    let ancestry = &active_node.ancestry;

    for i in 0..ancestry.len() {
        let node = ancestry[i];
        let entry_child = if i == 0 { None } else { Some(ancestry[i - 1]) };

        match node.kind(node_id_map) {
            Some(AstNodeKind::IdentifierExpression) if i == 1 => {
                if let Some(name) = identifier_expression_name(node_id_map, tokens, node.id()) {
                    items.push(ScopeItem { name, origin_node_id: node.id() });
                }
            }
            Some(AstNodeKind::EachExpression) => {
                items.push(ScopeItem { name: "_".to_string(), origin_node_id: node.id() });
            }
            Some(AstNodeKind::LetExpression) => {
                scope_from_let(node_id_map, tokens, node.id(), entry_child, &mut items);
            }
            Some(AstNodeKind::FunctionExpression) => {
                scope_from_function(node_id_map, tokens, node.id(), entry_child, &mut items);
            }
            Some(AstNodeKind::RecordExpression) => {
                scope_from_record(node_id_map, tokens, node.id(), ancestry, i, &mut items);
            }
            Some(AstNodeKind::Section) => {
                scope_from_section(node_id_map, tokens, node.id(), entry_child, &mut items);
            }
            Some(AstNodeKind::InvokeExpression) => {
                scope_from_invoke(node_id_map, tokens, node.id(), ancestry, i, &mut items);
            }
            _ => {}
        }
    }

    Scope(items)
}

fn identifier_expression_name(node_id_map: &NodeIdMapCollection, tokens: &[Token], id: u32) -> Option<String> {
    let child_id = *node_id_map.children_of(id).first()?;
    token_text(node_id_map, tokens, child_id).map(|s| s.to_string())
}

/// Bindings strictly before the one the position is inside are in scope;
/// once the position has moved past the binding list (into the `in`
/// clause, i.e. `entry_child` isn't one of the bindings) every binding is.
fn scope_from_let(
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
    let_id: u32,
    entry_child: Option<XorNode>,
    items: &mut Vec<ScopeItem>,
) {
    let children = node_id_map.children_of(let_id);
    let bindings: Vec<u32> = children
        .iter()
        .copied()
        .filter(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::IdentifierPairedExpression))
        .collect();

    let boundary = entry_child.and_then(|entry| bindings.iter().position(|&b| b == entry.id()));

    let take = boundary.unwrap_or(bindings.len());
    for &binding_id in &bindings[..take] {
        if let Some(name) = identifier_text(node_id_map, tokens, binding_id) {
            items.push(ScopeItem { name: name.to_string(), origin_node_id: binding_id });
        }
    }
}

/// Every parameter is visible both in the body and from its own position
/// onward in the parameter list (§4.6), so unlike `let`/record scoping
/// this doesn't need to find a boundary index.
fn scope_from_function(
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
    function_id: u32,
    _entry_child: Option<XorNode>,
    items: &mut Vec<ScopeItem>,
) {
    let Some(&parameter_list_id) = node_id_map.children_of(function_id).first() else { return };
    let parameters = node_id_map
        .children_of(parameter_list_id)
        .iter()
        .copied()
        .filter(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Parameter));

    for param_id in parameters {
        let Some(&identifier_id) = node_id_map.children_of(param_id).first() else { continue };
        if let Some(name) = token_text(node_id_map, tokens, identifier_id) {
            items.push(ScopeItem { name: name.to_string(), origin_node_id: param_id });
        }
    }
}

/// Unlike `let` (which excludes the binding a position is nested inside, so
/// a value can't see its own name), a key is visible from within its own
/// value here: the boundary is the entry pair's index *inclusive*, not
/// exclusive, so a field nested arbitrarily deep inside its own value still
/// sees the enclosing key (§9 open question).
///
/// Pairs sit two levels below the record: `RecordExpression` -> `CsvArray`
/// -> one `Csv` per field -> the paired-expression itself.
/// `ancestry[index - 1]` is always the `CsvArray` (its direct child on the
/// walk up), so the `Csv` the position is nested inside, if any, is
/// `ancestry[index - 2]`.
fn scope_from_record(
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
    record_id: u32,
    ancestry: &[XorNode],
    index: usize,
    items: &mut Vec<ScopeItem>,
) {
    let Some(array_id) = node_id_map
        .children_of(record_id)
        .iter()
        .copied()
        .find(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::CsvArray))
    else {
        return;
    };

    let pairs: Vec<(u32, u32)> = node_id_map
        .children_of(array_id)
        .iter()
        .copied()
        .filter(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
        .filter_map(|csv_id| node_id_map.children_of(csv_id).first().copied().map(|pair_id| (csv_id, pair_id)))
        .collect();

    // `ancestry[index - 1]` is the record's direct child on the walk up: the
    // `CsvArray` when the position is nested inside some field, or the
    // record's own bracket `Constant` when it's sitting on the record's own
    // delimiter instead (e.g. `[a=[b=1`, cursor right after the inner `[`).
    // In the latter case nothing has been entered yet, so scope depends only
    // on which side of the array the bracket sits.
    let entry_child = ancestry[index - 1];
    let take = if entry_child.id() == array_id {
        let current_csv_id = (index >= 2).then(|| ancestry[index - 2].id());
        let boundary = current_csv_id.and_then(|csv_id| pairs.iter().position(|&(c, _)| c == csv_id));
        match boundary {
            Some(i) => i + 1,
            None => pairs.len(),
        }
    } else {
        let array_start = node_id_map.context_node_by_id.get(&array_id).map(|n| n.token_index_start);
        let entry_start = entry_child.token_index_start(node_id_map);
        match (entry_start, array_start) {
            (Some(e), Some(a)) if e < a => 0,
            _ => pairs.len(),
        }
    };

    for &(_, pair_id) in &pairs[..take] {
        if let Some(name) = identifier_text(node_id_map, tokens, pair_id) {
            items.push(ScopeItem { name: name.to_string(), origin_node_id: pair_id });
        }
    }
}

/// Unlike `let`, a member's own trailing expression can see the member's own
/// name (recursion/self-reference within a section is ordinary M), so the
/// boundary is inclusive of the member the position is inside, matching
/// record scoping rather than `let` scoping.
/// Every other argument is visible from within one argument's own
/// expression (`foo(x, y)` with the position in `y` sees `x` too), and the
/// callee's own name is always in scope last, whether or not it resolves to
/// an actual function (§4.6). The argument the position is already inside
/// is skipped here since the `IdentifierExpression` walk above already
/// pushed it.
fn scope_from_invoke(
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
    invoke_id: u32,
    ancestry: &[XorNode],
    index: usize,
    items: &mut Vec<ScopeItem>,
) {
    let children = node_id_map.children_of(invoke_id);
    let Some(&head_id) = children.first() else { return };

    let Some(array_id) = children.iter().copied().find(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::CsvArray)) else {
        if let Some(name) = identifier_expression_name(node_id_map, tokens, head_id) {
            items.push(ScopeItem { name, origin_node_id: head_id });
        }
        return;
    };

    let csv_ids: Vec<u32> = node_id_map
        .children_of(array_id)
        .iter()
        .copied()
        .filter(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
        .collect();

    let entry_child = ancestry[index - 1];
    let current_csv_id = (entry_child.id() == array_id && index >= 2).then(|| ancestry[index - 2].id());

    for &csv_id in &csv_ids {
        if Some(csv_id) == current_csv_id {
            continue;
        }
        let Some(&arg_id) = node_id_map.children_of(csv_id).first() else { continue };
        if let Some(name) = identifier_expression_name(node_id_map, tokens, arg_id) {
            items.push(ScopeItem { name, origin_node_id: arg_id });
        }
    }

    if let Some(name) = identifier_expression_name(node_id_map, tokens, head_id) {
        items.push(ScopeItem { name, origin_node_id: head_id });
    }
}

fn scope_from_section(
    node_id_map: &NodeIdMapCollection,
    tokens: &[Token],
    section_id: u32,
    entry_child: Option<XorNode>,
    items: &mut Vec<ScopeItem>,
) {
    let members: Vec<u32> = node_id_map
        .children_of(section_id)
        .iter()
        .copied()
        .filter(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::SectionMember))
        .collect();

    let boundary = entry_child.and_then(|entry| members.iter().position(|&m| m == entry.id()));
    let take = boundary.map(|i| i + 1).unwrap_or(members.len());

    for &member_id in &members[..take] {
        let member_children = node_id_map.children_of(member_id);
        let identifier_id = member_children
            .iter()
            .copied()
            .find(|&c| node_id_map.kind_of(c) == Some(AstNodeKind::Identifier));
        if let Some(identifier_id) = identifier_id {
            if let Some(name) = token_text(node_id_map, tokens, identifier_id) {
                items.push(ScopeItem { name: name.to_string(), origin_node_id: member_id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use triomphe::Arc;

    use crate::inspection::active_node::find_active_node;
    use crate::lexer::lex_from_split;
    use crate::parser::{try_parse, ParserKind};
    use crate::settings::Settings;
    use crate::snapshot::try_snapshot;

    use super::compute_scope;

    fn scope_at(text: &str, code_unit: u32) -> Vec<String> {
        let lexer_state = lex_from_split(text, "\n");
        let snapshot = Arc::new(try_snapshot(&lexer_state).unwrap());
        let settings = Settings::default();
        let ok = try_parse(&settings, snapshot.clone()).unwrap();
        let position = crate::common::position::Position::new(code_unit, 0, code_unit);
        let active = find_active_node(position, &ok.node_id_map, &ok.leaf_ids, snapshot.tokens(), ok.root);
        compute_scope(&active, &ok.node_id_map, snapshot.tokens()).names().map(str::to_string).collect()
    }

    #[test]
    fn let_binding_excludes_its_own_value_but_sees_earlier_bindings() {
        // Cursor on `y`'s own name: `x` (the earlier binding) is visible,
        // `y` is not yet (it's the binding being defined).
        let names = scope_at("let x = 1, y = x in y", 11);
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn let_body_sees_every_binding() {
        // `w` doesn't shadow either binding, so the only entries besides the
        // self-referenced `w` are the two bindings, in source order.
        let names = scope_at("let x = 1, y = 2 in w", 20);
        assert_eq!(names, vec!["w", "x", "y"]);
    }

    #[test]
    fn combinatorial_reader_agrees_with_recursive_descent() {
        let lexer_state = lex_from_split("let x = 1, y = 2 in w", "\n");
        let snapshot = Arc::new(try_snapshot(&lexer_state).unwrap());
        let mut settings = Settings::default();
        settings.parser = ParserKind::Combinatorial;
        let ok = try_parse(&settings, snapshot.clone()).unwrap();
        let position = crate::common::position::Position::new(20, 0, 20);
        let active = find_active_node(position, &ok.node_id_map, &ok.leaf_ids, snapshot.tokens(), ok.root);
        let names: Vec<String> = compute_scope(&active, &ok.node_id_map, snapshot.tokens()).names().map(str::to_string).collect();
        assert_eq!(names, vec!["w", "x", "y"]);
    }
}
