use super::token_kind::TokenKind;

/// Fixed keyword table (§4.1): an identifier-shaped read is reclassified
/// into its keyword token iff it matches one of these literals exactly.
pub fn lookup(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match text {
        "and" => KeywordAnd,
        "as" => KeywordAs,
        "each" => KeywordEach,
        "else" => KeywordElse,
        "error" => KeywordError,
        "false" => KeywordFalse,
        "if" => KeywordIf,
        "in" => KeywordIn,
        "is" => KeywordIs,
        "let" => KeywordLet,
        "meta" => KeywordMeta,
        "not" => KeywordNot,
        "otherwise" => KeywordOtherwise,
        "or" => KeywordOr,
        "section" => KeywordSection,
        "shared" => KeywordShared,
        "then" => KeywordThen,
        "true" => KeywordTrue,
        "try" => KeywordTry,
        "type" => KeywordType,
        "null" => NullLiteral,
        "optional" => KeywordOptional,
        "nullable" => KeywordNullable,
        _ => return None,
    })
}

/// Reclassifies a `#`-prefixed bareword read at lexing time, e.g. `#date`.
/// `#"quoted identifier"` is handled separately by the cursor, never through
/// this table.
pub fn lookup_hash_keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match text {
        "#binary" => KeywordHashBinary,
        "#date" => KeywordHashDate,
        "#datetime" => KeywordHashDateTime,
        "#datetimezone" => KeywordHashDateTimeZone,
        "#duration" => KeywordHashDuration,
        "#infinity" => KeywordHashInfinity,
        "#nan" => KeywordHashNan,
        "#sections" => KeywordHashSections,
        "#shared" => KeywordHashShared,
        "#table" => KeywordHashTable,
        "#time" => KeywordHashTime,
        _ => return None,
    })
}

/// Primitive type names recognized for `as`/`is`/`type` completion (§4.6).
/// `type` and `null` double as real keywords; the rest are plain
/// identifiers validated contextually by the parser, matching how the
/// original grammar treats primitive type names as non-reserved words.
pub const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "any",
    "anynonnull",
    "binary",
    "date",
    "datetime",
    "datetimezone",
    "duration",
    "function",
    "list",
    "logical",
    "none",
    "null",
    "number",
    "record",
    "table",
    "text",
    "time",
    "type",
];
