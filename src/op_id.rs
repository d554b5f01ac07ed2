//! Lightweight unique identifier for operators within a
//! [`LogicalPlan`](crate::plan::LogicalPlan).
//!
//! Each [`Operator`](crate::operator::Operator) inserted into the plan arena
//! is assigned a sequential `OpId`. These are opaque handles—edges reference
//! operators by id, and the validator and optimizer key their visited sets,
//! property memos and cost memos off them.
//!
//! They’re small, `Copy`, hashable and ordered, so they can be used
//! efficiently as keys in maps or sets when traversing the plan, and the
//! ordering reflects declaration order (useful for deterministic tie-breaks).

use serde::{Deserialize, Serialize};

/// Unique numeric identifier for an operator in a plan graph.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct OpId(u64);

impl OpId {
    /// Create a new `OpId` (used internally by the plan builder).
    pub(crate) fn new(v: u64) -> Self {
        Self(v)
    }

    /// Return the underlying numeric value.
    ///
    /// Useful mainly for debugging or serialization.
    pub fn raw(&self) -> u64 {
        self.0
    }
}
