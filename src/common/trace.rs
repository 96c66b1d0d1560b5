//! Per-rule trace sink (§6 `traceManager`). A no-op manager disables
//! tracing entirely; tooling (e.g. a benchmarking harness) can supply its
//! own sink without the reader knowing the difference.

/// One entry emitted when a grammar rule is entered.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    pub rule_name: &'a str,
}

pub trait TraceManager {
    fn enter_rule(&self, event: TraceEvent<'_>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceManager;

impl TraceManager for NoopTraceManager {
    fn enter_rule(&self, _event: TraceEvent<'_>) {}
}
