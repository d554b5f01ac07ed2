//! Cost estimation for candidate strategy assignments.
//!
//! A simple additive model over estimated data volumes: data-movement cost is
//! the shipped volume times a per-strategy multiplier, local-execution cost
//! is the consumed volume times a multiplier depending on whether sorting or
//! hashing is actually needed, and nested-loop pairings are quadratic in the
//! chosen outer side's cardinality. Estimates come from per-operator hints
//! when declared and fall back to crate defaults otherwise — absent hints
//! never fail compilation.
//!
//! Costs are plain `f64`s; minimum selection goes through
//! [`ordered_float::OrderedFloat`] so comparisons are total.

use crate::operator::{CostHints, DualInputKind, Operator, SingleInputKind};
use crate::key::KeyDescriptor;
use crate::properties::PhysicalProps;
use crate::strategy::ShipStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback estimates used when a hint is absent.
pub const DEFAULT_SOURCE_CARDINALITY: f64 = 100_000.0;
pub const DEFAULT_RECORD_BYTES: f64 = 64.0;

/// Default output/input cardinality ratios per operator kind.
const DEFAULT_MAP_RATIO: f64 = 1.0;
const DEFAULT_REDUCE_RATIO: f64 = 0.1;
const DEFAULT_PAIRING_RATIO: f64 = 1.0;

/// Local multipliers: a fresh sort is the most expensive way to group, a
/// hash table is cheaper, and a blocked nested loop beats a streamed one.
const SORT_MULTIPLIER: f64 = 2.0;
const HASH_GROUP_MULTIPLIER: f64 = 1.5;
const NESTED_LOOP_BLOCKED_MULTIPLIER: f64 = 1.0;
const NESTED_LOOP_STREAMED_MULTIPLIER: f64 = 1.5;

/// Estimated size of one operator output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estimates {
    /// Estimated record count.
    pub cardinality: f64,
    /// Estimated average record size in bytes.
    pub record_bytes: f64,
}

impl Estimates {
    /// Estimated total data volume in bytes.
    pub fn volume(&self) -> f64 {
        self.cardinality * self.record_bytes
    }
}

impl fmt::Display for Estimates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "~{:.0} records x {:.0} B",
            self.cardinality, self.record_bytes
        )
    }
}

/// Estimates for a source output.
pub(crate) fn source_estimates(hints: &CostHints) -> Estimates {
    Estimates {
        cardinality: hints.cardinality.unwrap_or(DEFAULT_SOURCE_CARDINALITY),
        record_bytes: hints.avg_record_bytes.unwrap_or(DEFAULT_RECORD_BYTES),
    }
}

/// Estimates for a non-source operator output, given the estimates of its
/// input slots (one entry for single-input operators, two for dual-input).
pub(crate) fn output_estimates(op: &Operator, inputs: &[Estimates]) -> Estimates {
    let hints = &op.core().hints;
    match op {
        Operator::Source { .. } => source_estimates(hints),
        // Sinks emit nothing; carry the input estimate for reporting.
        Operator::Sink { .. } => inputs.first().copied().unwrap_or(Estimates {
            cardinality: 0.0,
            record_bytes: DEFAULT_RECORD_BYTES,
        }),
        Operator::SingleInput { kind, .. } => {
            let input = inputs[0];
            let ratio = hints.cardinality_ratio.unwrap_or(match kind {
                SingleInputKind::Map => DEFAULT_MAP_RATIO,
                SingleInputKind::Reduce { .. } => DEFAULT_REDUCE_RATIO,
            });
            Estimates {
                cardinality: input.cardinality * ratio,
                record_bytes: hints.avg_record_bytes.unwrap_or(input.record_bytes),
            }
        }
        Operator::DualInput { kind, .. } => {
            let (a, b) = (inputs[0], inputs[1]);
            let ratio = hints.cardinality_ratio.unwrap_or(DEFAULT_PAIRING_RATIO);
            let base = match kind {
                DualInputKind::Cross => a.cardinality * b.cardinality,
                DualInputKind::Join { .. } | DualInputKind::CoGroup { .. } => {
                    a.cardinality.max(b.cardinality)
                }
            };
            Estimates {
                cardinality: base * ratio,
                record_bytes: hints
                    .avg_record_bytes
                    .unwrap_or(a.record_bytes + b.record_bytes),
            }
        }
    }
}

/// Cost of moving one producer's output over an edge.
///
/// `Forward` moves nothing; hash and range partitioning ship the volume
/// once; broadcast replicates it once per consuming instance.
pub(crate) fn ship_cost(
    ship: &ShipStrategy,
    upstream: &Estimates,
    consumer_parallelism: usize,
) -> f64 {
    match ship {
        ShipStrategy::Forward => 0.0,
        ShipStrategy::Broadcast => upstream.volume() * consumer_parallelism as f64,
        ShipStrategy::HashPartition(_) | ShipStrategy::RangePartition(_) => upstream.volume(),
    }
}

/// Cost of sorting one input slot by `key`; free when the arriving order
/// already provides it.
pub(crate) fn sort_cost(arrived: &PhysicalProps, est: &Estimates, key: &KeyDescriptor) -> f64 {
    if arrived.sorted_by(key) {
        0.0
    } else {
        est.volume() * SORT_MULTIPLIER
    }
}

/// Cost of building a hash table over one input slot.
pub(crate) fn hash_group_cost(est: &Estimates) -> f64 {
    est.volume() * HASH_GROUP_MULTIPLIER
}

/// Cost of a nested-loop pairing, quadratic in the outer side's cardinality
/// so the smaller side is the preferred outer.
pub(crate) fn nested_loop_cost(outer_cardinality: f64, streamed: bool) -> f64 {
    let multiplier = if streamed {
        NESTED_LOOP_STREAMED_MULTIPLIER
    } else {
        NESTED_LOOP_BLOCKED_MULTIPLIER
    };
    outer_cardinality * outer_cardinality * multiplier
}
