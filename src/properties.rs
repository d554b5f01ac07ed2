//! Physical property sets and their propagation rules.
//!
//! A [`PhysicalProps`] describes what is *already guaranteed* about an
//! operator's output under a candidate strategy assignment: how the data is
//! partitioned across task instances, and whether each partition is sorted by
//! some key. Property sets must stay sound — they never claim a guarantee
//! the upstream strategy does not actually provide — and the optimizer uses
//! them to skip re-partitioning and re-sorting that upstream work already
//! paid for.
//!
//! Three transfer functions cover the pipeline: [`PhysicalProps::after_ship`]
//! (what survives the wire), [`PhysicalProps::after_local`] (what the local
//! strategy establishes), and [`PhysicalProps::filtered_through`] (what the
//! operator's user function is *declared* to keep alive). The last one is the
//! mechanism that avoids redundant shuffles across chained grouping
//! operators: strategy alone cannot prove a function keeps its input key, but
//! a declared capability record can.

use crate::key::KeyDescriptor;
use crate::operator::SemanticProps;
use crate::strategy::{LocalStrategy, ShipStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How records are spread across the parallel instances of an operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Partitioning {
    /// No guarantee.
    None,
    /// Records with equal key values share a partition (hash routing).
    HashedBy(KeyDescriptor),
    /// Partitions hold disjoint, ordered key ranges.
    ///
    /// The ordering guarantee of a range partitioner lives *between*
    /// partitions; records inside one partition are not sorted by it.
    RangedBy(KeyDescriptor),
    /// All records are in one single partition.
    Single,
}

/// Whether records inside each partition are sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    None,
    SortedBy(KeyDescriptor),
}

/// The property set attached to an operator output during optimization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalProps {
    pub partitioning: Partitioning,
    pub order: SortOrder,
}

impl PhysicalProps {
    /// No guarantees at all.
    pub fn none() -> Self {
        Self {
            partitioning: Partitioning::None,
            order: SortOrder::None,
        }
    }

    /// True if records with equal values of `key` are guaranteed to share a
    /// partition. A single partition trivially qualifies.
    pub fn partitioned_by(&self, key: &KeyDescriptor) -> bool {
        match &self.partitioning {
            Partitioning::HashedBy(k) | Partitioning::RangedBy(k) => k == key,
            Partitioning::Single => true,
            Partitioning::None => false,
        }
    }

    /// True if each partition is sorted by `key`.
    pub fn sorted_by(&self, key: &KeyDescriptor) -> bool {
        matches!(&self.order, SortOrder::SortedBy(k) if k == key)
    }

    /// The property set after records travel over an edge with the given
    /// ship strategy.
    pub fn after_ship(&self, ship: &ShipStrategy) -> PhysicalProps {
        match ship {
            // Nothing moves between partitions; everything survives.
            ShipStrategy::Forward => self.clone(),
            // Every consumer sees all data: partitioning is gone, but each
            // replica is received in produced order.
            ShipStrategy::Broadcast => PhysicalProps {
                partitioning: Partitioning::None,
                order: self.order.clone(),
            },
            // Repartitioning interleaves records from all producers; any
            // previous order is destroyed.
            ShipStrategy::HashPartition(k) => PhysicalProps {
                partitioning: Partitioning::HashedBy(k.clone()),
                order: SortOrder::None,
            },
            ShipStrategy::RangePartition(k) => PhysicalProps {
                partitioning: Partitioning::RangedBy(k.clone()),
                order: SortOrder::None,
            },
        }
    }

    /// The per-partition property set after the operator's local strategy has
    /// organized its input.
    pub fn after_local(&self, local: &LocalStrategy) -> PhysicalProps {
        match local {
            LocalStrategy::None => self.clone(),
            LocalStrategy::SortMerge(k) => PhysicalProps {
                partitioning: self.partitioning.clone(),
                order: SortOrder::SortedBy(k.clone()),
            },
            LocalStrategy::HashGroup(_) => PhysicalProps {
                partitioning: self.partitioning.clone(),
                order: SortOrder::None,
            },
            LocalStrategy::NestedLoopBlocked(_) | LocalStrategy::NestedLoopStreamed(_) => {
                PhysicalProps {
                    partitioning: self.partitioning.clone(),
                    order: SortOrder::None,
                }
            }
        }
    }

    /// What the operator's user function keeps alive, per its declared
    /// capability record.
    ///
    /// Partitioning by a key survives iff every key field is declared
    /// preserved or constant. Ordering additionally requires `unique_key`:
    /// a function emitting several records per input key could interleave
    /// them arbitrarily, which would break sortedness even with preserved
    /// fields.
    pub fn filtered_through(&self, semantics: &SemanticProps) -> PhysicalProps {
        let partitioning = match &self.partitioning {
            Partitioning::HashedBy(k) if semantics.keeps_stable(k.fields()) => {
                Partitioning::HashedBy(k.clone())
            }
            Partitioning::RangedBy(k) if semantics.keeps_stable(k.fields()) => {
                Partitioning::RangedBy(k.clone())
            }
            // A single partition is a placement fact, not a data fact; no
            // function can undo it.
            Partitioning::Single => Partitioning::Single,
            _ => Partitioning::None,
        };
        let order = match &self.order {
            SortOrder::SortedBy(k)
                if semantics.unique_key && semantics.preserves_all(k.fields()) =>
            {
                SortOrder::SortedBy(k.clone())
            }
            _ => SortOrder::None,
        };
        PhysicalProps {
            partitioning,
            order,
        }
    }

    /// The meet of two property sets, for slots fed by several edges (union
    /// semantics): identical partitionings survive the union, everything
    /// else degrades to no guarantee. Ordering never survives a union — the
    /// merged stream is not sorted without an explicit merge step.
    pub fn meet(&self, other: &PhysicalProps) -> PhysicalProps {
        let partitioning = if self.partitioning == other.partitioning {
            self.partitioning.clone()
        } else {
            Partitioning::None
        };
        PhysicalProps {
            partitioning,
            order: SortOrder::None,
        }
    }
}

impl fmt::Display for PhysicalProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.partitioning {
            Partitioning::None => write!(f, "unpartitioned")?,
            Partitioning::HashedBy(k) => write!(f, "hashed-by {k}")?,
            Partitioning::RangedBy(k) => write!(f, "ranged-by {k}")?,
            Partitioning::Single => write!(f, "single-partition")?,
        }
        match &self.order {
            SortOrder::None => Ok(()),
            SortOrder::SortedBy(k) => write!(f, ", sorted-by {k}"),
        }
    }
}
