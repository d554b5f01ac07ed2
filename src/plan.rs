//! Plan assembly and the immutable logical plan arena.
//!
//! We keep a tiny graph: operators live in an arena keyed by [`OpId`] and
//! edges reference them by id, so diamond-shaped DAGs (one producer feeding
//! several consumers, or several producers feeding one union slot) need no
//! shared ownership. A [`PlanBuilder`] is the assembly surface used by the
//! external program; [`LogicalPlan`] is what the compiler consumes, by
//! reference and without mutation.

use crate::op_id::OpId;
use crate::operator::Operator;
use crate::strategy::Side;
use std::collections::BTreeMap;

/// A directed connection from one operator's output to another's input slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: OpId,
    pub to: OpId,
    pub side: Side,
}

/// Mutable plan-assembly surface.
///
/// Ids are handed out sequentially, so iteration over the finished plan in id
/// order is declaration order. `build()` freezes the graph into a
/// [`LogicalPlan`]; nothing is validated here (that is the validator's job).
#[derive(Default)]
pub struct PlanBuilder {
    next_id: u64,
    ops: BTreeMap<OpId, Operator>,
    edges: Vec<Edge>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an operator and return its id.
    pub fn add(&mut self, op: Operator) -> OpId {
        let id = OpId::new(self.next_id);
        self.next_id += 1;
        self.ops.insert(id, op);
        id
    }

    /// Connect `from`'s output to `to`'s first (or only) input slot.
    pub fn connect(&mut self, from: OpId, to: OpId) {
        self.connect_side(from, to, Side::First);
    }

    /// Connect `from`'s output to the given input slot of `to`.
    ///
    /// Multiple edges into the same slot carry union semantics.
    pub fn connect_side(&mut self, from: OpId, to: OpId, side: Side) {
        self.edges.push(Edge { from, to, side });
    }

    /// Freeze the assembled graph.
    pub fn build(self) -> LogicalPlan {
        let sinks = self
            .ops
            .iter()
            .filter(|(_, op)| matches!(op, Operator::Sink { .. }))
            .map(|(id, _)| *id)
            .collect();
        LogicalPlan {
            ops: self.ops,
            edges: self.edges,
            sinks,
        }
    }
}

/// The immutable operator DAG consumed by the compiler.
pub struct LogicalPlan {
    ops: BTreeMap<OpId, Operator>,
    edges: Vec<Edge>,
    sinks: Vec<OpId>,
}

impl LogicalPlan {
    pub fn operator(&self, id: OpId) -> Option<&Operator> {
        self.ops.get(&id)
    }

    /// All operators in declaration order.
    pub fn operators(&self) -> impl Iterator<Item = (OpId, &Operator)> {
        self.ops.iter().map(|(id, op)| (*id, op))
    }

    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All sink operators, in declaration order.
    pub fn sinks(&self) -> &[OpId] {
        &self.sinks
    }

    /// Edges feeding any slot of `to`, in connection order.
    pub fn input_edges(&self, to: OpId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to == to)
    }

    /// Producer ids feeding the given slot of `to`, in connection order.
    pub fn inputs(&self, to: OpId, side: Side) -> Vec<OpId> {
        self.edges
            .iter()
            .filter(|e| e.to == to && e.side == side)
            .map(|e| e.from)
            .collect()
    }

    /// Consumer ids fed by `from`, in connection order.
    pub fn consumers(&self, from: OpId) -> Vec<OpId> {
        self.edges
            .iter()
            .filter(|e| e.from == from)
            .map(|e| e.to)
            .collect()
    }

    /// Operators reachable from the sinks, in a deterministic topological
    /// (source-to-sink) order.
    ///
    /// Requires an acyclic graph (certified by the validator); ties between
    /// ready operators resolve by declaration order.
    pub fn topo_order(&self) -> Vec<OpId> {
        // Restrict to the sink-reachable subgraph first.
        let mut reachable = std::collections::BTreeSet::new();
        let mut stack: Vec<OpId> = self.sinks.clone();
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            for edge in self.input_edges(id) {
                stack.push(edge.from);
            }
        }

        let mut pending: BTreeMap<OpId, usize> = reachable
            .iter()
            .map(|id| {
                let deps = self.input_edges(*id).filter(|e| reachable.contains(&e.from)).count();
                (*id, deps)
            })
            .collect();

        let mut order = Vec::with_capacity(pending.len());
        while order.len() < reachable.len() {
            // BTreeMap iteration gives the smallest ready id first.
            let Some(next) = pending
                .iter()
                .find(|(_, deps)| **deps == 0)
                .map(|(id, _)| *id)
            else {
                break;
            };
            pending.remove(&next);
            order.push(next);
            for consumer in self.consumers(next) {
                if let Some(deps) = pending.get_mut(&consumer) {
                    *deps = deps.saturating_sub(1);
                }
            }
        }
        order
    }
}
