//! Canonical compile error taxonomy.
//!
//! Classification guidance:
//! - [`CompileError::MissingInput`]: an operator has fewer connected inputs
//!   than its arity requires
//! - [`CompileError::InvalidLocation`]: a source/sink location descriptor is
//!   empty or lacks a recognized scheme
//! - [`CompileError::CyclicPlan`]: the DAG traversal re-entered an operator
//!   through the in-progress path
//! - [`CompileError::UnsatisfiableRequirement`]: no admissible combination of
//!   ship and local strategies satisfies an operator's data requirement
//!
//! All of these are terminal for the compilation attempt: they indicate a
//! malformed or inexpressible plan, not a transient condition, so nothing is
//! retried and nothing is silently defaulted. Every variant names the
//! offending operator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// An operator is missing a required input connection.
    ///
    /// Sinks and single-input operators need at least one connected input;
    /// dual-input operators need at least one on each side independently.
    #[error("operator '{operator}' has fewer connected inputs than its arity requires")]
    MissingInput { operator: String },

    /// A source or sink location descriptor is malformed.
    ///
    /// Accepted descriptors are non-empty and start with `file://` or
    /// `hdfs://`.
    #[error("operator '{operator}' has an invalid location descriptor \"{location}\"")]
    InvalidLocation { operator: String, location: String },

    /// The plan graph contains a cycle.
    #[error("plan contains a cycle through operator '{operator}'")]
    CyclicPlan { operator: String },

    /// No admissible strategy combination satisfies an operator's data
    /// requirement.
    ///
    /// Example: a grouping operator whose key descriptor names no fields.
    #[error("no admissible strategy for operator '{operator}': {reason}")]
    UnsatisfiableRequirement { operator: String, reason: String },
}

/// Standard compile result alias.
pub type Result<T> = std::result::Result<T, CompileError>;
