/// A line's continuation state (§3 "LexerLine"): what multi-line construct,
/// if any, was still open when lexing reached the end of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    #[default]
    Normal,
    InsideString,
    InsideQuotedIdentifier,
    InsideMultilineComment,
}
