//! Recognized settings (§6). Every field has a default so callers can use
//! `Settings::default()` and override only what they need, set one at a
//! time rather than through a single derived constructor.

use std::rc::Rc;

use crate::common::cancellation::{CancellationToken, NeverCancelled};
use crate::common::trace::{NoopTraceManager, TraceManager};
use crate::localization::Locale;
use crate::parser::ParserKind;

/// Hook for tooling to wrap the parse state, e.g. a benchmark harness that
/// wants to intercept every `ParseContext` as it is created. The core never
/// calls this itself beyond handing the constructed state back.
pub type ParseStateFactory = Rc<dyn Fn(crate::parser::ParseState) -> crate::parser::ParseState>;

#[derive(Clone)]
pub struct Settings {
    pub locale: Locale,
    pub parser: ParserKind,
    pub parse_state_factory: Option<ParseStateFactory>,
    pub cancellation_token: Rc<dyn CancellationToken>,
    pub trace_manager: Rc<dyn TraceManager>,
    /// Reserved for parser-specific tuning. Ignored by both core readers;
    /// present so tooling built against this crate can pass options through
    /// without a breaking change later.
    pub maybe_parser_options: Option<Rc<dyn std::any::Any>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            parser: ParserKind::default(),
            parse_state_factory: None,
            cancellation_token: Rc::new(NeverCancelled),
            trace_manager: Rc::new(NoopTraceManager),
            maybe_parser_options: None,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("locale", &self.locale)
            .field("parser", &self.parser)
            .field("parse_state_factory", &self.parse_state_factory.is_some())
            .finish()
    }
}
