//! Text & grapheme utilities (module A): splitting source text into lines by
//! a configured terminator.

/// Splits `text` on `terminator`, preserving the terminator-free line
/// contents. An empty document still yields a single empty line, matching
/// the lexer's boundary behavior (§8: empty input lexes with zero tokens).
pub fn split_lines<'a>(text: &'a str, terminator: &str) -> Vec<&'a str> {
    if terminator.is_empty() {
        return vec![text];
    }
    text.split(terminator).collect()
}

/// Code-unit (UTF-16) length of `s`, used to compute per-line absolute
/// positions without assuming the host's string encoding.
pub fn code_unit_len(s: &str) -> u32 {
    s.chars().map(|c| c.len_utf16() as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminator() {
        assert_eq!(split_lines("a\nb\nc", "\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_text_yields_one_line() {
        assert_eq!(split_lines("", "\n"), vec![""]);
    }

    #[test]
    fn code_unit_len_counts_surrogate_pairs() {
        // U+1F600 GRINNING FACE requires a UTF-16 surrogate pair.
        assert_eq!(code_unit_len("😀"), 2);
        assert_eq!(code_unit_len("ab"), 2);
    }
}
