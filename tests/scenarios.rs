//! End-to-end scenarios against the public task facade (§8 "Concrete
//! scenarios"). Each test drives `try_lex_parse_inspection`/`try_lex_parse`
//! directly the way a host editor would, rather than reaching into any
//! individual module.

use pretty_assertions::assert_eq;
use unindent::unindent;

use pq_parser::ast::AstNodeKind;
use pq_parser::parser::ParseErrorKind;
use pq_parser::{task, Position, Settings};

fn pos(code_unit: u32) -> Position {
    Position::new(code_unit, 0, code_unit)
}

#[test]
fn each_expression_scopes_underscore() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "each 1", "\n", pos(4)).unwrap();
    assert_eq!(inspected.scope.names().collect::<Vec<_>>(), vec!["_"]);
}

#[test]
fn function_body_scopes_parameters_and_itself() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "(x, y) => z", "\n", pos(11)).unwrap();
    assert_eq!(inspected.scope.names().collect::<Vec<_>>(), vec!["z", "x", "y"]);
}

#[test]
fn invoke_reports_argument_position_and_sibling_scope() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "foo(x, y)", "\n", pos(8)).unwrap();

    let invoke = inspected.invoke.expect("ancestry should contain an InvokeExpression");
    assert_eq!(invoke.name.as_deref(), Some("foo"));
    assert_eq!(invoke.num_arguments, 2);
    assert_eq!(invoke.position_argument_index, Some(1));

    assert_eq!(inspected.scope.names().collect::<Vec<_>>(), vec!["y", "x", "foo"]);
}

#[test]
fn trailing_comma_at_eof_counts_as_an_empty_invoke_argument() {
    let settings = Settings::default();
    let lex_parse = task::try_lex_parse(&settings, "foo(x,", "\n").unwrap();
    let err = lex_parse.tried_parse.as_ref().expect_err("missing closing paren is a parse error");
    assert!(matches!(err.kind, ParseErrorKind::UnterminatedParenthesis { .. }));

    let inspected = task::try_inspection(&settings, &lex_parse.tried_parse, &lex_parse.snapshot, pos(6)).unwrap();
    let invoke = inspected.invoke.expect("ancestry should contain an InvokeExpression");
    assert_eq!(invoke.name.as_deref(), Some("foo"));
    assert_eq!(invoke.num_arguments, 2);
    assert_eq!(invoke.position_argument_index, Some(1), "the empty slot after the comma is the second argument");

    assert_eq!(inspected.scope.names().collect::<Vec<_>>(), vec!["x", "foo"], "x is a completed sibling argument, not the one under the cursor");
}

#[test]
fn attribute_record_unlocks_section_keyword_autocomplete() {
    let settings = Settings::default();
    let text = "[Documentation.Name=\"x\"] ";
    let inspected = task::try_lex_parse_inspection(&settings, text, "\n", pos(text.len() as u32)).unwrap();
    assert_eq!(inspected.autocomplete_keyword, vec!["section"]);
}

#[test]
fn attribute_record_unlocks_shared_keyword_autocomplete_for_a_member() {
    let settings = Settings::default();
    let text = "section foo; [Documentation.Name=\"x\"] ";
    let inspected = task::try_lex_parse_inspection(&settings, text, "\n", pos(text.len() as u32)).unwrap();
    assert_eq!(inspected.autocomplete_keyword, vec!["shared"]);
}

#[test]
fn second_parameter_offers_optional_keyword() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "(x, op) => x", "\n", pos(7)).unwrap();
    assert!(inspected.autocomplete_keyword.contains(&"optional"));
}

#[test]
fn section_scope_is_inclusive_of_the_member_holding_the_cursor() {
    let settings = Settings::default();
    let text = "section foo; x = 1; y = 2;";
    let inspected = task::try_lex_parse_inspection(&settings, text, "\n", pos(26)).unwrap();
    assert_eq!(inspected.scope.names().collect::<Vec<_>>(), vec!["x", "y"]);
}

#[test]
fn optional_parameter_cannot_precede_a_required_one() {
    let settings = Settings::default();
    let lex_parse = task::try_lex_parse(&settings, "(optional x, y) => x", "\n").unwrap();
    let err = lex_parse.tried_parse.expect_err("a required parameter after an optional one must fail to parse");

    match err.kind {
        ParseErrorKind::RequiredParameterAfterOptional { token } => assert_eq!(token.text, "y"),
        other => panic!("expected RequiredParameterAfterOptional, got {other:?}"),
    }
}

#[test]
fn nested_record_scope_stops_at_the_opening_bracket_not_yet_entered() {
    let settings = Settings::default();
    let lex_parse = task::try_lex_parse(&settings, "[a=[b=1", "\n").unwrap();
    let err = lex_parse.tried_parse.as_ref().expect_err("an unterminated bracket is a parse error");
    assert!(matches!(err.kind, ParseErrorKind::UnterminatedBracket { .. }));

    let record_contexts = err
        .state
        .node_id_map
        .context_node_by_id
        .values()
        .filter(|n| n.kind == AstNodeKind::RecordExpression)
        .count();
    assert_eq!(record_contexts, 2, "both the outer and inner record should still be open");

    let inspected =
        task::try_inspection(&settings, &lex_parse.tried_parse, &lex_parse.snapshot, pos(4)).unwrap();
    assert_eq!(inspected.scope.names().collect::<Vec<_>>(), vec!["a"]);
    assert!(inspected.autocomplete_keyword.is_empty());
}

#[test]
fn half_typed_otherwise_still_completes_as_a_keyword() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "try true o", "\n", pos(11)).unwrap();
    let mut keywords = inspected.autocomplete_keyword.clone();
    keywords.sort_unstable();
    assert_eq!(keywords, vec!["or", "otherwise"]);
}

#[test]
fn as_expression_completes_the_nullable_constant() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "a as n", "\n", pos(7)).unwrap();
    assert_eq!(
        inspected.autocomplete_language_constant,
        Some(pq_parser::inspection::LanguageConstant::Nullable)
    );
}

#[test]
fn parameter_name_slot_completes_the_optional_constant() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "(x, op", "\n", pos(7)).unwrap();
    assert_eq!(
        inspected.autocomplete_language_constant,
        Some(pq_parser::inspection::LanguageConstant::Optional)
    );
}

#[test]
fn multiline_record_fields_are_each_wrapped_in_a_csv() {
    let settings = Settings::default();
    let text = unindent(
        "
        [
            a = 1,
            b = 2
        ]",
    );
    let lex_parse = task::try_lex_parse(&settings, text.trim(), "\n").unwrap();
    let ok = lex_parse.tried_parse.expect("well-formed record should parse");

    let array_id = find_descendant(&ok.node_id_map, ok.root.id(), AstNodeKind::CsvArray)
        .expect("record should have a CsvArray child");
    let csvs = ok
        .node_id_map
        .children_of(array_id)
        .iter()
        .filter(|&&c| ok.node_id_map.kind_of(c) == Some(AstNodeKind::Csv))
        .count();
    assert_eq!(csvs, 2);
}

/// Depth-first search for the first descendant (inclusive) of `kind`.
fn find_descendant(
    node_id_map: &pq_parser::parser::NodeIdMapCollection,
    root: u32,
    kind: AstNodeKind,
) -> Option<u32> {
    if node_id_map.kind_of(root) == Some(kind) {
        return Some(root);
    }
    node_id_map
        .children_of(root)
        .iter()
        .find_map(|&c| find_descendant(node_id_map, c, kind))
}

#[test]
fn empty_document_parses_with_no_children_and_start_of_document_keywords() {
    let settings = Settings::default();
    let lex_parse = task::try_lex_parse(&settings, "", "\n").unwrap();
    assert!(lex_parse.snapshot.tokens().is_empty());
    let ok = lex_parse.tried_parse.as_ref().expect("empty input is a valid, childless document");
    assert!(ok.node_id_map.children_of(ok.root.id()).is_empty());

    let inspected = task::try_inspection(&settings, &lex_parse.tried_parse, &lex_parse.snapshot, pos(0)).unwrap();
    assert!(inspected.scope.names().next().is_none());
    assert!(inspected.invoke.is_none());
    let mut keywords = inspected.autocomplete_keyword.clone();
    keywords.sort_unstable();
    let mut expected = vec!["each", "let", "if", "try", "error", "not", "type", "section"];
    expected.sort_unstable();
    assert_eq!(keywords, expected);
}

#[test]
fn position_strictly_before_first_token_is_out_of_bounds() {
    let settings = Settings::default();
    // The lexer doesn't tokenize leading whitespace, so code unit 0 sits
    // strictly before `x`'s own token start at code unit 1.
    let inspected = task::try_lex_parse_inspection(&settings, " x", "\n", pos(0)).unwrap();
    assert!(inspected.scope.names().next().is_none());
    assert!(inspected.invoke.is_none());
}

#[test]
fn type_slot_completes_primitive_type_names_by_prefix() {
    let settings = Settings::default();
    let inspected = task::try_lex_parse_inspection(&settings, "type n", "\n", pos(7)).unwrap();
    let mut names = inspected.autocomplete_primitive_type.clone();
    names.sort_unstable();
    assert_eq!(names, vec!["none", "null", "number"]);
}
