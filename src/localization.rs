//! Localization is a boundary collaborator (§1 non-goal, §6): the core
//! produces a structured error tag plus its fields, and a template table
//! renders the final string. This module owns only the locale selection and
//! the default (`en-US`) template table; a tooling host is free to supply
//! richer tables for other locales without touching the core error types.

use std::fmt;

/// A selected locale. An unknown locale (one with no registered template
/// table) falls back to [`Locale::EnUs`] rather than failing (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "en-US" | "en-us" | "en" => Locale::EnUs,
            _ => Locale::EnUs,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EnUs => write!(f, "en-US"),
        }
    }
}

/// Renders a stable error tag name (as listed in §6) to a human sentence.
/// Structural fields (tokens, positions, found/expected kinds) are expected
/// to already be formatted into `detail` by the caller; this function only
/// owns the locale-specific phrasing around them.
pub fn template(locale: Locale, tag: &str, detail: &str) -> String {
    match locale {
        Locale::EnUs => {
            if detail.is_empty() {
                tag.to_string()
            } else {
                format!("{tag}: {detail}")
            }
        }
    }
}
