//! Common errors (§7): invariant violations, unknown/programmer errors, and
//! cancellation. These signal something other than a malformed document and
//! are surfaced to callers uninterpreted.

use thiserror::Error;

/// Which bookkeeping invariant (§3, I1-I6) was observed to be violated.
/// Structured so a caller can log the details without string-parsing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantKind {
    /// I1: an id appeared in neither or both of `astNodeById` / `contextNodeById`.
    NodeIdOwnership,
    /// I2/I3: `childIdsById` and `parentIdById` are not mutual inverses.
    ParentChildMismatch,
    /// I4: a leaf id was not present in `astNodeById`.
    LeafNotAst,
    /// I5: `idsByNodeKind` disagreed with the union of the two node maps.
    NodeKindIndex,
    /// I6: a completed node's token interval did not nest its children's.
    TokenIntervalNesting,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("internal invariant violated: {kind:?} (node {node_id})")]
    Invariant { kind: InvariantKind, node_id: u32 },

    #[error("operation was cancelled")]
    Cancellation,
}
