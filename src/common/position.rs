//! Absolute text positions and the grapheme-column derivation used only for
//! human-facing error messages (§3 "Position").

/// A triple of `(codeUnit, lineNumber, lineCodeUnit)`. `codeUnit` is the
/// absolute UTF-16 code-unit offset from the start of the document;
/// `lineNumber` is the 0-based line index; `lineCodeUnit` is the code-unit
/// offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub code_unit: u32,
    pub line_number: u32,
    pub line_code_unit: u32,
}

impl Position {
    pub const fn new(code_unit: u32, line_number: u32, line_code_unit: u32) -> Self {
        Self {
            code_unit,
            line_number,
            line_code_unit,
        }
    }

    pub const ROOT: Position = Position::new(0, 0, 0);
}

/// A position rendered in grapheme clusters rather than code units, used
/// exclusively to format error messages. Never used for range math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphemePosition {
    pub line_number: u32,
    pub grapheme_column: u32,
}

/// Counts grapheme clusters up to (but not including) `code_unit_offset`
/// within `line`. We approximate cluster boundaries with `char` boundaries:
/// Power Query source is not expected to carry combining marks in positions
/// that matter for tooling, and a full grapheme-breaking table is out of
/// scope for this crate.
pub fn grapheme_column(line: &str, code_unit_offset: u32) -> u32 {
    let mut code_units = 0u32;
    let mut column = 0u32;
    for ch in line.chars() {
        if code_units >= code_unit_offset {
            break;
        }
        code_units += ch.len_utf16() as u32;
        column += 1;
    }
    column
}

pub fn to_grapheme_position(line: &str, position: Position) -> GraphemePosition {
    GraphemePosition {
        line_number: position.line_number,
        grapheme_column: grapheme_column(line, position.line_code_unit),
    }
}
