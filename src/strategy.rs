//! Strategy vocabulary: how records move between operators and how an
//! operator consumes its input locally.
//!
//! A [`ShipStrategy`] is attached to every physical edge and describes the
//! data movement between the producing and consuming task groups. A
//! [`LocalStrategy`] is attached to every physical vertex and describes how
//! one task instance organizes its input before calling the user function.
//!
//! The optimizer picks both; overrides supplied via compiler hints bypass the
//! cost comparison entirely.

use crate::key::KeyDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input slot of a dual-input operator an edge feeds.
///
/// Single-input operators always use [`Side::First`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

/// Data-movement strategy for one edge of the physical plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipStrategy {
    /// Records stay in their producing partition.
    Forward,
    /// Every consuming instance receives the full data set.
    Broadcast,
    /// Records are routed by a hash over the key fields.
    HashPartition(KeyDescriptor),
    /// Records are routed into key ranges; partitions are ordered relative to
    /// each other.
    RangePartition(KeyDescriptor),
}

impl ShipStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            ShipStrategy::Forward => "Forward",
            ShipStrategy::Broadcast => "Broadcast",
            ShipStrategy::HashPartition(_) => "HashPartition",
            ShipStrategy::RangePartition(_) => "RangePartition",
        }
    }

    /// `Forward` is the no-op choice: it moves nothing across the network.
    pub fn is_noop(&self) -> bool {
        matches!(self, ShipStrategy::Forward)
    }
}

impl fmt::Display for ShipStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipStrategy::Forward => write!(f, "Forward"),
            ShipStrategy::Broadcast => write!(f, "Broadcast"),
            ShipStrategy::HashPartition(k) => write!(f, "HashPartition({k})"),
            ShipStrategy::RangePartition(k) => write!(f, "RangePartition({k})"),
        }
    }
}

/// Local-execution strategy for one operator of the physical plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalStrategy {
    /// No local organization (sources, sinks, pure maps).
    None,
    /// Sort the input by the key and feed consecutive groups to the function.
    SortMerge(KeyDescriptor),
    /// Build an in-memory hash table over the key.
    HashGroup(KeyDescriptor),
    /// Pair the two inputs block-wise, with the given side as the outer.
    NestedLoopBlocked(Side),
    /// Pair the two inputs by streaming the outer side once per inner block.
    NestedLoopStreamed(Side),
}

impl LocalStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            LocalStrategy::None => "None",
            LocalStrategy::SortMerge(_) => "SortMerge",
            LocalStrategy::HashGroup(_) => "HashGroup",
            LocalStrategy::NestedLoopBlocked(_) => "NestedLoopBlocked",
            LocalStrategy::NestedLoopStreamed(_) => "NestedLoopStreamed",
        }
    }

    /// The outer side of a nested-loop pairing, if this is one.
    pub fn outer_side(&self) -> Option<Side> {
        match self {
            LocalStrategy::NestedLoopBlocked(s) | LocalStrategy::NestedLoopStreamed(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for LocalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalStrategy::None => write!(f, "None"),
            LocalStrategy::SortMerge(k) => write!(f, "SortMerge({k})"),
            LocalStrategy::HashGroup(k) => write!(f, "HashGroup({k})"),
            LocalStrategy::NestedLoopBlocked(s) => write!(f, "NestedLoopBlocked(outer={s})"),
            LocalStrategy::NestedLoopStreamed(s) => write!(f, "NestedLoopStreamed(outer={s})"),
        }
    }
}
