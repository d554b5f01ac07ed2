//! The physical plan: the compiler's externally visible artifact.
//!
//! A [`PhysicalPlan`] is isomorphic to the logical DAG it was compiled from —
//! same operator identities, same edges — but every edge carries its chosen
//! data-movement strategy and every vertex carries its chosen local strategy,
//! final degree of parallelism, and the output estimates used during costing.
//! It is immutable once emitted and serializable for external inspectors.
//!
//! [`PhysicalPlan::explain`] renders a human-readable report of the plan and
//! of the optimization decisions taken while compiling it.

use crate::cost::Estimates;
use crate::op_id::OpId;
use crate::properties::PhysicalProps;
use crate::strategy::{LocalStrategy, ShipStrategy, Side};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Represents an optimization decision made while compiling the plan.
#[derive(Debug, Clone, Serialize)]
pub enum PlanDecision {
    /// An upstream partitioning/ordering already satisfied a requirement, so
    /// the edge stays a no-op `Forward`.
    ReusedPartitioning { operator: String, side: Side },
    /// A repartitioning ship strategy was inserted to satisfy a requirement.
    Repartitioned {
        operator: String,
        side: Side,
        strategy: String,
    },
    /// One side of a pairing operator is replicated to every instance.
    BroadcastSide { operator: String, side: Side },
    /// The outer side chosen for a nested-loop pairing.
    OuterSide { operator: String, side: Side },
    /// Parallelism was forced to 1 by a single-partition requirement.
    ForcedSingleParallelism { operator: String },
    /// An authoritative hint override bypassed cost comparison.
    OverrideApplied { operator: String },
}

/// One operator of the physical plan.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalVertex {
    pub id: OpId,
    pub name: String,
    /// Kind label (`Source`, `Map`, `Reduce`, ...), for diagnostics.
    pub kind: String,
    pub local: LocalStrategy,
    pub parallelism: usize,
    /// Output size estimate used during costing.
    pub estimates: Estimates,
    /// Guaranteed output properties under the chosen strategies.
    pub props: PhysicalProps,
}

/// One edge of the physical plan.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalEdge {
    pub from: OpId,
    pub to: OpId,
    pub side: Side,
    pub ship: ShipStrategy,
}

/// The optimizer's output DAG.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalPlan {
    vertices: Vec<PhysicalVertex>,
    edges: Vec<PhysicalEdge>,
    sinks: Vec<OpId>,
    /// Total estimated cost of the selected strategy assignment.
    pub total_cost: f64,
    decisions: Vec<PlanDecision>,
    #[serde(skip)]
    index: HashMap<OpId, usize>,
}

impl PhysicalPlan {
    pub(crate) fn new(
        vertices: Vec<PhysicalVertex>,
        edges: Vec<PhysicalEdge>,
        sinks: Vec<OpId>,
        total_cost: f64,
        decisions: Vec<PlanDecision>,
    ) -> Self {
        let index = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, i))
            .collect();
        Self {
            vertices,
            edges,
            sinks,
            total_cost,
            decisions,
            index,
        }
    }

    pub fn vertex(&self, id: OpId) -> Option<&PhysicalVertex> {
        self.index.get(&id).map(|i| &self.vertices[*i])
    }

    /// Vertices in topological (source-to-sink) order.
    pub fn vertices(&self) -> &[PhysicalVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[PhysicalEdge] {
        &self.edges
    }

    pub fn sinks(&self) -> &[OpId] {
        &self.sinks
    }

    /// Edges feeding any slot of `to`, in connection order.
    pub fn input_edges(&self, to: OpId) -> impl Iterator<Item = &PhysicalEdge> {
        self.edges.iter().filter(move |e| e.to == to)
    }

    pub fn decisions(&self) -> &[PlanDecision] {
        &self.decisions
    }

    /// Generate a detailed, printable explanation of the compiled plan.
    #[must_use]
    pub fn explain(&self) -> PlanExplanation {
        PlanExplanation { plan: self.clone() }
    }
}

/// Printable report over a compiled plan.
#[derive(Debug, Clone)]
pub struct PlanExplanation {
    plan: PhysicalPlan,
}

impl Display for PlanExplanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(
            f,
            "┌─ PHYSICAL PLAN ──────────────────────────────────────────────┐"
        )?;
        writeln!(f, "│ Total estimated cost: {:.0}", self.plan.total_cost)?;
        for v in &self.plan.vertices {
            writeln!(f, "│")?;
            writeln!(
                f,
                "│ {} '{}' (dop={})",
                v.kind, v.name, v.parallelism
            )?;
            writeln!(f, "│   local: {}", v.local)?;
            writeln!(f, "│   output: {} ({})", v.props, v.estimates)?;
            for e in self.plan.input_edges(v.id) {
                let producer = self
                    .plan
                    .vertex(e.from)
                    .map(|p| p.name.as_str())
                    .unwrap_or("?");
                writeln!(f, "│   input[{}] <- '{}' via {}", e.side, producer, e.ship)?;
            }
        }
        writeln!(
            f,
            "└──────────────────────────────────────────────────────────────┘"
        )?;

        if !self.plan.decisions.is_empty() {
            writeln!(
                f,
                "┌─ DECISIONS ──────────────────────────────────────────────────┐"
            )?;
            for d in &self.plan.decisions {
                match d {
                    PlanDecision::ReusedPartitioning { operator, side } => {
                        writeln!(
                            f,
                            "│ • '{operator}': reused upstream partitioning on {side} input"
                        )?;
                    }
                    PlanDecision::Repartitioned {
                        operator,
                        side,
                        strategy,
                    } => {
                        writeln!(f, "│ • '{operator}': {strategy} inserted on {side} input")?;
                    }
                    PlanDecision::BroadcastSide { operator, side } => {
                        writeln!(f, "│ • '{operator}': broadcasting {side} input")?;
                    }
                    PlanDecision::OuterSide { operator, side } => {
                        writeln!(f, "│ • '{operator}': nested loop with {side} input as outer")?;
                    }
                    PlanDecision::ForcedSingleParallelism { operator } => {
                        writeln!(f, "│ • '{operator}': parallelism forced to 1")?;
                    }
                    PlanDecision::OverrideApplied { operator } => {
                        writeln!(f, "│ • '{operator}': strategy override applied")?;
                    }
                }
            }
            writeln!(
                f,
                "└──────────────────────────────────────────────────────────────┘"
            )?;
        }
        Ok(())
    }
}
