//! Plan well-formedness checking.
//!
//! Traverses a plan from its sinks and checks that every reachable operator
//! is correctly connected to its inputs: sinks and single-input operators
//! need at least one connected input, dual-input operators need at least one
//! on each side independently, and source/sink location descriptors must be
//! non-empty and carry a recognized scheme prefix.
//!
//! The traversal keeps an owned visited set so each operator is checked
//! exactly once; a diamond-shaped DAG revisits a shared ancestor through a
//! *finished* path, which is skipped, while a revisit through the
//! *in-progress* path is a cycle and fails with
//! [`CompileError::CyclicPlan`]. Any failure aborts compilation before
//! optimization begins — optimizing an ill-formed graph is undefined.

use crate::error::{CompileError, Result};
use crate::op_id::OpId;
use crate::operator::Operator;
use crate::plan::LogicalPlan;
use crate::strategy::Side;
use std::collections::HashSet;
use tracing::debug;

const ACCEPTED_SCHEMES: [&str; 2] = ["file://", "hdfs://"];

/// Check that the plan is well formed.
///
/// # Errors
///
/// [`CompileError::MissingInput`], [`CompileError::InvalidLocation`] or
/// [`CompileError::CyclicPlan`], naming the offending operator.
pub fn validate(plan: &LogicalPlan) -> Result<()> {
    validate_counted(plan).map(|_| ())
}

/// Like [`validate`], but returns how many operators were checked.
///
/// On a valid plan this equals the number of sink-reachable operators, and
/// repeating the call yields the same count: the visited set is owned by the
/// invocation, so revalidation touches each operator exactly once again.
pub fn validate_counted(plan: &LogicalPlan) -> Result<usize> {
    let mut visited: HashSet<OpId> = HashSet::new();
    let mut on_path: HashSet<OpId> = HashSet::new();

    for sink in plan.sinks() {
        visit(plan, *sink, &mut visited, &mut on_path)?;
    }
    debug!(checked = visited.len(), "plan validated");
    Ok(visited.len())
}

enum Frame {
    Enter(OpId),
    Exit(OpId),
}

fn visit(
    plan: &LogicalPlan,
    start: OpId,
    visited: &mut HashSet<OpId>,
    on_path: &mut HashSet<OpId>,
) -> Result<()> {
    let mut stack = vec![Frame::Enter(start)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(id) => {
                if visited.contains(&id) {
                    // Shared ancestor reached through a finished path.
                    continue;
                }
                if !on_path.insert(id) {
                    let name = plan
                        .operator(id)
                        .map(|op| op.name().to_string())
                        .unwrap_or_else(|| format!("#{}", id.raw()));
                    return Err(CompileError::CyclicPlan { operator: name });
                }

                let Some(op) = plan.operator(id) else {
                    // Dangling edge target; treat as a missing input of the plan.
                    return Err(CompileError::MissingInput {
                        operator: format!("#{}", id.raw()),
                    });
                };
                check_operator(plan, id, op)?;

                stack.push(Frame::Exit(id));
                for edge in plan.input_edges(id) {
                    if on_path.contains(&edge.from) {
                        return Err(CompileError::CyclicPlan {
                            operator: plan
                                .operator(edge.from)
                                .map(|op| op.name().to_string())
                                .unwrap_or_else(|| format!("#{}", edge.from.raw())),
                        });
                    }
                    stack.push(Frame::Enter(edge.from));
                }
            }
            Frame::Exit(id) => {
                on_path.remove(&id);
                visited.insert(id);
            }
        }
    }
    Ok(())
}

fn check_operator(plan: &LogicalPlan, id: OpId, op: &Operator) -> Result<()> {
    match op {
        Operator::Source { location, .. } => check_location(op, location),
        Operator::Sink { location, .. } => {
            check_location(op, location)?;
            check_connected(plan, id, op, Side::First)
        }
        Operator::SingleInput { .. } => check_connected(plan, id, op, Side::First),
        Operator::DualInput { .. } => {
            check_connected(plan, id, op, Side::First)?;
            check_connected(plan, id, op, Side::Second)
        }
    }
}

fn check_connected(plan: &LogicalPlan, id: OpId, op: &Operator, side: Side) -> Result<()> {
    if plan.inputs(id, side).is_empty() {
        debug!(operator = op.name(), side = %side, "unconnected input slot");
        return Err(CompileError::MissingInput {
            operator: op.name().to_string(),
        });
    }
    Ok(())
}

fn check_location(op: &Operator, location: &str) -> Result<()> {
    if location.is_empty() || !ACCEPTED_SCHEMES.iter().any(|s| location.starts_with(s)) {
        return Err(CompileError::InvalidLocation {
            operator: op.name().to_string(),
            location: location.to_string(),
        });
    }
    Ok(())
}
