//! Token-stream snapshots (§3). A handful of representative fixtures,
//! rendered the way a reviewer would eyeball a token dump rather than
//! asserting on each field individually.

use expect_test::expect_file;
use unindent::unindent;

use pq_parser::lexer::lex_from_split;
use pq_parser::snapshot::try_snapshot;

fn render(text: &str) -> String {
    let lexer_state = lex_from_split(text, "\n");
    let snapshot = try_snapshot(&lexer_state).unwrap();
    let mut out = snapshot
        .tokens()
        .iter()
        .map(|t| format!("{:?} {:?}", t.kind, t.text))
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

#[test]
fn simple_let_expression_tokens() {
    expect_file!["tests/test_data/lexer_simple_let.txt"].assert_eq(&render("let x = 1 in x"));
}

#[test]
fn multiline_record_tokens() {
    let text = unindent(
        "
        [
            a = 1,
            b = 2
        ]",
    );
    expect_file!["tests/test_data/lexer_multiline_record.txt"].assert_eq(&render(text.trim()));
}
