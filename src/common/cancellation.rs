//! Cooperative cancellation (§5). The reader polls a [`CancellationToken`]
//! at the start of every rule and before allocating a new context node.

/// A cooperative cancel source. Mirrors the `LimitTracker` idiom the
/// recursion-depth guard uses: a small piece of state the parser consults
/// at rule boundaries rather than anything that can interrupt control flow.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

/// The default token: parsing never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationToken for std::sync::atomic::AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(std::sync::atomic::Ordering::Relaxed)
    }
}
