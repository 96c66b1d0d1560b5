use std::collections::BTreeMap;
use std::rc::Rc;

use crate::common::position::Position;
use crate::common::text::{code_unit_len, split_lines};

use super::error::{
    BadLineNumberKind, BadRangeKind, LexError, LineLexError, UnterminatedMultilineTokenKind,
};
use super::line::{lex_line, LexerLine, LineItem, MultilineKind};
use super::mode::LineMode;

/// A half-open `(startLine, startCodeUnit) .. (endLine, endCodeUnit)` range
/// used by [`LexerState::try_update_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start_line_number: i64,
    pub start_line_code_unit: u32,
    pub end_line_number: i64,
    pub end_line_code_unit: u32,
}

/// §3 "LexerState": an ordered sequence of [`LexerLine`]s sharing one line
/// terminator. Every mutating operation returns a new state; lines that
/// were not re-lexed are `Rc`-shared with the previous state.
#[derive(Debug, Clone)]
pub struct LexerState {
    pub lines: Vec<Rc<LexerLine>>,
    pub line_terminator: Rc<str>,
}

impl LexerState {
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// §3: empty iff the state lexes cleanly. Also synthesizes an
    /// `UnterminatedMultilineToken` entry for a document that ends mid
    /// multi-line construct, attributed to the line that opened it.
    pub fn error_line_map(&self) -> BTreeMap<usize, LineLexError> {
        let mut map = BTreeMap::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if let Some(err) = &line.error {
                map.insert(idx, err.clone());
            }
        }

        if let Some(last) = self.lines.last() {
            if last.mode_leave != LineMode::Normal {
                if let Some(opening_idx) = self.find_open_start_index(self.lines.len() - 1) {
                    let opening = &self.lines[opening_idx];
                    if let Some(open) = &opening.multiline_open {
                        let kind = match open.kind {
                            MultilineKind::String => UnterminatedMultilineTokenKind::String,
                            MultilineKind::QuotedIdentifier => {
                                UnterminatedMultilineTokenKind::QuotedIdentifier
                            }
                            MultilineKind::Comment => UnterminatedMultilineTokenKind::MultilineComment,
                        };
                        map.entry(opening_idx).or_insert(LineLexError::UnterminatedMultilineToken {
                            kind,
                            opening_position: open.start_position,
                        });
                    }
                }
            }
        }

        map
    }

    /// Walks backward from `line_index` to the line whose `multiline_open`
    /// started the still-open run it belongs to.
    fn find_open_start_index(&self, line_index: usize) -> Option<usize> {
        let mut i = line_index;
        loop {
            if self.lines[i].multiline_open.is_some() {
                return Some(i);
            }
            if i == 0 {
                return None;
            }
            i -= 1;
        }
    }

    pub fn is_error_free(&self) -> bool {
        self.error_line_map().is_empty()
    }
}

/// Module B contract: `lexFromSplit(text, lineTerminator) -> LexerState`.
/// Always succeeds; per-line failures are reported through `errorLineMap`.
pub fn lex_from_split(text: &str, line_terminator: &str) -> LexerState {
    let terminator = if line_terminator.is_empty() { "\n" } else { line_terminator };
    let raw_lines = split_lines(text, terminator);

    let mut lines = Vec::with_capacity(raw_lines.len());
    let mut code_unit = 0u32;
    let mut mode = LineMode::Normal;

    for (line_number, raw) in raw_lines.iter().enumerate() {
        let line_start = Position::new(code_unit, line_number as u32, 0);
        let text_rc: Rc<str> = Rc::from(*raw);
        let line = lex_line(text_rc, line_start, mode);
        mode = line.mode_leave;
        code_unit += code_unit_len(raw) + code_unit_len(terminator);
        lines.push(Rc::new(line));
    }

    LexerState {
        lines,
        line_terminator: Rc::from(terminator),
    }
}

fn shift_line(line: &LexerLine, delta: i64) -> LexerLine {
    let mut new_line = line.clone();
    new_line.line_start = shift_position(line.line_start, delta);
    for item in &mut new_line.items {
        match item {
            LineItem::Token(t) => {
                t.position_start = shift_position(t.position_start, delta);
                t.position_end = shift_position(t.position_end, delta);
            }
            LineItem::Comment(c) => {
                c.position_start = shift_position(c.position_start, delta);
                c.position_end = shift_position(c.position_end, delta);
            }
        }
    }
    if let Some(open) = &mut new_line.multiline_open {
        open.start_position = shift_position(open.start_position, delta);
    }
    new_line
}

fn shift_position(position: Position, delta: i64) -> Position {
    Position::new(
        (position.code_unit as i64 + delta) as u32,
        position.line_number,
        position.line_code_unit,
    )
}

impl LexerState {
    /// Re-lexes `index` and every following line whose entering mode
    /// changes as a result, relexing the rest and shifting the positions of
    /// lines whose content and mode are unaffected (§4.1).
    pub fn try_update_line(&self, index: usize, text: &str) -> Result<LexerState, LexError> {
        self.validate_line_number(index)?;
        self.splice_lines(index, index + 1, vec![text.to_string()])
    }

    pub fn try_append(&self, text: &str) -> Result<LexerState, LexError> {
        let raw_lines = split_lines(text, &self.line_terminator);
        let insert_at = self.lines.len();
        self.splice_lines(insert_at, insert_at, raw_lines.into_iter().map(String::from).collect())
    }

    pub fn try_delete_line(&self, index: usize) -> Result<LexerState, LexError> {
        self.validate_line_number(index)?;
        self.splice_lines(index, index + 1, vec![])
    }

    pub fn try_update_range(&self, range: Range, text: &str) -> Result<LexerState, LexError> {
        self.validate_range(range)?;
        let start_idx = range.start_line_number as usize;
        let end_idx = range.end_line_number as usize;

        let prefix = &self.lines[start_idx].text[..byte_offset(&self.lines[start_idx].text, range.start_line_code_unit)];
        let suffix_line = &self.lines[end_idx].text;
        let suffix = &suffix_line[byte_offset(suffix_line, range.end_line_code_unit)..];

        let replacement_text = format!("{prefix}{text}{suffix}");
        let new_raw_lines: Vec<String> = split_lines(&replacement_text, &self.line_terminator)
            .into_iter()
            .map(String::from)
            .collect();

        self.splice_lines(start_idx, end_idx + 1, new_raw_lines)
    }

    fn validate_line_number(&self, index: usize) -> Result<(), LexError> {
        let num_lines = self.num_lines();
        if index >= num_lines {
            return Err(LexError::BadLineNumber {
                kind: BadLineNumberKind::GreaterThanNumLines,
                line_number: index as i64,
                num_lines,
            });
        }
        Ok(())
    }

    fn validate_range(&self, range: Range) -> Result<(), LexError> {
        let num_lines = self.num_lines() as i64;
        if range.start_line_number < 0 {
            return Err(LexError::BadRange { kind: BadRangeKind::LineNumberStartLessThanZero });
        }
        if range.start_line_number > range.end_line_number {
            return Err(LexError::BadRange {
                kind: BadRangeKind::LineNumberStartGreaterThanLineNumberEnd,
            });
        }
        if range.start_line_number >= num_lines {
            return Err(LexError::BadRange {
                kind: BadRangeKind::LineNumberStartGreaterThanNumLines,
            });
        }
        if range.end_line_number >= num_lines {
            return Err(LexError::BadRange { kind: BadRangeKind::LineNumberEndGreaterThanNumLines });
        }
        let start_line = &self.lines[range.start_line_number as usize];
        let end_line = &self.lines[range.end_line_number as usize];
        if code_unit_len(&start_line.text) < range.start_line_code_unit {
            return Err(LexError::BadRange {
                kind: BadRangeKind::LineCodeUnitStartGreaterThanLineLength,
            });
        }
        if code_unit_len(&end_line.text) < range.end_line_code_unit {
            return Err(LexError::BadRange { kind: BadRangeKind::LineCodeUnitEndGreaterThanLineLength });
        }
        if range.start_line_number == range.end_line_number
            && range.start_line_code_unit > range.end_line_code_unit
        {
            return Err(LexError::BadRange { kind: BadRangeKind::SameLineCodeUnitStartHigher });
        }
        Ok(())
    }

    /// Replaces `self.lines[remove_start..remove_end]` with freshly lexed
    /// lines built from `new_raw_lines`, then relexes forward only while the
    /// entering mode keeps changing, shifting (not relexing) everything
    /// after that point.
    fn splice_lines(
        &self,
        remove_start: usize,
        remove_end: usize,
        new_raw_lines: Vec<String>,
    ) -> Result<LexerState, LexError> {
        let mode_before = if remove_start == 0 {
            LineMode::Normal
        } else {
            self.lines[remove_start - 1].mode_leave
        };

        let old_code_unit_len: u32 = self.lines[remove_start..remove_end]
            .iter()
            .map(|l| code_unit_len(&l.text) + code_unit_len(&self.line_terminator))
            .sum();

        let mut code_unit = self.lines[..remove_start]
            .iter()
            .map(|l| code_unit_len(&l.text) + code_unit_len(&self.line_terminator))
            .sum::<u32>();

        let mut new_lines: Vec<Rc<LexerLine>> = Vec::new();
        new_lines.extend_from_slice(&self.lines[..remove_start]);

        let mut mode = mode_before;
        let mut new_code_unit_len = 0u32;
        for raw in &new_raw_lines {
            let line_start = Position::new(code_unit, (new_lines.len()) as u32, 0);
            let text_rc: Rc<str> = Rc::from(raw.as_str());
            let line = lex_line(text_rc, line_start, mode);
            mode = line.mode_leave;
            let len = code_unit_len(raw) + code_unit_len(&self.line_terminator);
            code_unit += len;
            new_code_unit_len += len;
            new_lines.push(Rc::new(line));
        }

        let delta = new_code_unit_len as i64 - old_code_unit_len as i64;

        let mut propagate_relex = true;
        for old_line in &self.lines[remove_end..] {
            if propagate_relex && old_line.mode_enter != mode {
                let shifted_text = old_line.text.clone();
                let line_start = Position::new(code_unit, new_lines.len() as u32, 0);
                let line = lex_line(shifted_text, line_start, mode);
                mode = line.mode_leave;
                code_unit += code_unit_len(&line.text) + code_unit_len(&self.line_terminator);
                new_lines.push(Rc::new(line));
            } else {
                propagate_relex = false;
                let shifted = shift_line(old_line, delta);
                code_unit += code_unit_len(&shifted.text) + code_unit_len(&self.line_terminator);
                new_lines.push(Rc::new(renumber_line(shifted, new_lines.len() as u32)));
            }
        }

        Ok(LexerState {
            lines: new_lines,
            line_terminator: self.line_terminator.clone(),
        })
    }
}

fn renumber_line(mut line: LexerLine, line_number: u32) -> LexerLine {
    line.line_start.line_number = line_number;
    for item in &mut line.items {
        match item {
            LineItem::Token(t) => {
                t.position_start.line_number = line_number;
                t.position_end.line_number = line_number;
            }
            LineItem::Comment(c) => {
                c.position_start.line_number = line_number;
                c.position_end.line_number = line_number;
            }
        }
    }
    line
}

fn byte_offset(s: &str, code_unit_offset: u32) -> usize {
    let mut units = 0u32;
    for (idx, c) in s.char_indices() {
        if units >= code_unit_offset {
            return idx;
        }
        units += c.len_utf16() as u32;
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_zero_tokens() {
        let state = lex_from_split("", "\n");
        assert_eq!(state.num_lines(), 1);
        assert!(state.is_error_free());
        assert_eq!(state.lines[0].tokens().count(), 0);
    }

    #[test]
    fn lexes_simple_let_expression() {
        let state = lex_from_split("let x = 1 in x", "\n");
        assert!(state.is_error_free());
        let kinds: Vec<_> = state.lines[0].tokens().map(|t| t.kind).collect();
        use super::super::token_kind::TokenKind::*;
        assert_eq!(
            kinds,
            vec![KeywordLet, Identifier, Equal, Numeric, KeywordIn, Identifier]
        );
    }

    #[test]
    fn update_line_relexes_only_when_mode_changes() {
        let initial = lex_from_split("x = 1;\ny = 2;", "\n");
        let updated = initial.try_update_line(0, "x = 10;").unwrap();
        // second line's mode_enter is unaffected (still Normal -> Normal),
        // so its content is shifted, not relexed, but token kinds survive.
        let kinds: Vec<_> = updated.lines[1].tokens().map(|t| t.kind).collect();
        use super::super::token_kind::TokenKind::*;
        assert_eq!(kinds, vec![Identifier, Equal, Numeric, Semicolon]);
    }

    #[test]
    fn unterminated_string_reports_error_on_opening_line() {
        let state = lex_from_split("x = \"abc\ny = 2", "\n");
        let errors = state.error_line_map();
        assert!(errors.contains_key(&0));
    }
}
