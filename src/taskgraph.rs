//! Lowering the physical plan into an executable task graph.
//!
//! Each physical vertex becomes a [`TaskGroup`] of `parallelism` parallel
//! task instances; each physical edge becomes a [`Channel`] whose kind is
//! derived from the chosen ship strategy. The lowering is purely structural —
//! no cost decisions are made here — and the resulting graph is handed to the
//! external execution runtime, which owns scheduling instances onto cluster
//! nodes.

use crate::key::KeyDescriptor;
use crate::op_id::OpId;
use crate::physical::PhysicalPlan;
use crate::strategy::{LocalStrategy, ShipStrategy, Side};
use serde::{Deserialize, Serialize};

/// Identifier of one task group within a [`TaskGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskGroupId(pub usize);

/// One operator's worth of parallel task instances.
#[derive(Debug, Clone, Serialize)]
pub struct TaskGroup {
    pub id: TaskGroupId,
    /// Identity of the operator this group executes.
    pub operator: OpId,
    pub name: String,
    /// Kind label (`Source`, `Map`, `Reduce`, ...), for diagnostics.
    pub kind: String,
    pub parallelism: usize,
    pub local: LocalStrategy,
}

/// How records are routed between two key-range or hash partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionScheme {
    Hash,
    Range,
}

/// The wire shape of one lowered edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChannelKind {
    /// Instance `i` of the producer feeds instance `i` of the consumer.
    OneToOne,
    /// Producer and consumer parallelism differ; records are re-spread
    /// deterministically without a partitioning guarantee.
    Redistribute,
    /// Every consumer instance receives every producer instance's output.
    AllToAll,
    /// Records are routed by a hash or range function over the key.
    Partitioned {
        scheme: PartitionScheme,
        key: KeyDescriptor,
    },
}

/// A typed connection between two task groups.
#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    pub from: TaskGroupId,
    pub to: TaskGroupId,
    pub side: Side,
    pub kind: ChannelKind,
}

/// The executable lowering of a physical plan.
#[derive(Debug, Clone, Serialize)]
pub struct TaskGraph {
    pub groups: Vec<TaskGroup>,
    pub channels: Vec<Channel>,
}

impl TaskGraph {
    pub fn group_for(&self, operator: OpId) -> Option<&TaskGroup> {
        self.groups.iter().find(|g| g.operator == operator)
    }

    /// Export the graph to JSON for hand-off or inspection.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Lower a compiled plan into task groups and typed channels.
pub fn build_task_graph(plan: &PhysicalPlan) -> TaskGraph {
    let groups: Vec<TaskGroup> = plan
        .vertices()
        .iter()
        .enumerate()
        .map(|(i, v)| TaskGroup {
            id: TaskGroupId(i),
            operator: v.id,
            name: v.name.clone(),
            kind: v.kind.clone(),
            parallelism: v.parallelism,
            local: v.local.clone(),
        })
        .collect();

    let group_of = |op: OpId| {
        groups
            .iter()
            .find(|g| g.operator == op)
            .map(|g| (g.id, g.parallelism))
    };

    let channels = plan
        .edges()
        .iter()
        .filter_map(|e| {
            let (from, from_par) = group_of(e.from)?;
            let (to, to_par) = group_of(e.to)?;
            let kind = match &e.ship {
                ShipStrategy::Forward if from_par == to_par => ChannelKind::OneToOne,
                ShipStrategy::Forward => ChannelKind::Redistribute,
                ShipStrategy::Broadcast => ChannelKind::AllToAll,
                ShipStrategy::HashPartition(k) => ChannelKind::Partitioned {
                    scheme: PartitionScheme::Hash,
                    key: k.clone(),
                },
                ShipStrategy::RangePartition(k) => ChannelKind::Partitioned {
                    scheme: PartitionScheme::Range,
                    key: k.clone(),
                },
            };
            Some(Channel {
                from,
                to,
                side: e.side,
                kind,
            })
        })
        .collect();

    TaskGraph { groups, channels }
}
