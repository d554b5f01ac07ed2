//! Strategy enumeration and minimum-cost plan selection.
//!
//! The optimizer walks the validated logical DAG in topological
//! (source-to-sink) order and, for each operator, enumerates the admissible
//! combinations of per-edge ship strategies and a local strategy that satisfy
//! the operator's data requirement:
//!
//! 1. **Reuse first** — the zero-cost option of doing nothing is always
//!    considered when the upstream properties already satisfy the
//!    requirement; this reuse of existing partitioning/ordering is the
//!    dominant cost saving.
//! 2. **Repartition schemes** — hash or range partitioning per input slot,
//!    forwarding those edges whose upstream already provides the target.
//! 3. **Broadcast schemes** — for pairing operators, replicating one side to
//!    every consuming instance (inadmissible for co-group, which would
//!    duplicate the replicated side's groups).
//!
//! Candidates are costed with the additive model in [`crate::cost`] and the
//! cheapest wins; ties break by enumeration order, which follows declaration
//! order, so repeated compilation of an unchanged plan is reproducible.
//! Chosen output properties and size estimates are memoized per operator, so
//! fan-out to several consumers reuses one computed property set.
//!
//! Declared hint overrides are authoritative: they bypass cost comparison
//! for the overridden edge/operator entirely.

use crate::cost::{self, Estimates};
use crate::error::{CompileError, Result};
use crate::key::KeyDescriptor;
use crate::op_id::OpId;
use crate::operator::{DualInputKind, Operator, SingleInputKind};
use crate::physical::{PhysicalEdge, PhysicalPlan, PhysicalVertex, PlanDecision};
use crate::plan::{Edge, LogicalPlan};
use crate::properties::{Partitioning, PhysicalProps};
use crate::strategy::{LocalStrategy, ShipStrategy, Side};
use crate::validate::validate;
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use tracing::debug;

/// Plan-wide compilation settings.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Degree of parallelism inherited by operators that declare none.
    pub default_parallelism: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_parallelism: num_cpus::get().max(2),
        }
    }
}

impl CompilerConfig {
    pub fn with_default_parallelism(dop: usize) -> Self {
        Self {
            default_parallelism: dop.max(1),
        }
    }
}

/// Validate `plan`, then compile it into a physical plan.
///
/// This is the main entry point: validation failures abort before any
/// optimization work is attempted.
///
/// # Errors
///
/// Any [`CompileError`]; see [`validate`](crate::validate::validate) and
/// [`optimize`].
pub fn compile(plan: &LogicalPlan, config: &CompilerConfig) -> Result<PhysicalPlan> {
    validate(plan)?;
    optimize(plan, config)
}

/// Select strategies for an already-validated plan.
///
/// The caller is responsible for having run the validator; feeding an
/// unvalidated plan here is undefined (well-formedness is a precondition of
/// the topological walk).
///
/// # Errors
///
/// [`CompileError::UnsatisfiableRequirement`] when no admissible strategy
/// combination exists for some operator.
pub fn optimize(plan: &LogicalPlan, config: &CompilerConfig) -> Result<PhysicalPlan> {
    let mut opt = Optimizer {
        plan,
        config,
        props: HashMap::new(),
        stats: HashMap::new(),
        dop: HashMap::new(),
        ships: HashMap::new(),
        vertices: Vec::new(),
        decisions: Vec::new(),
        total_cost: 0.0,
    };
    for id in plan.topo_order() {
        opt.place(id)?;
    }
    Ok(opt.finish())
}

/// One admissible combination of edge ships and a local strategy.
struct Candidate {
    /// Chosen ship per logical edge index.
    ships: Vec<(usize, ShipStrategy)>,
    local: LocalStrategy,
    cost: f64,
}

struct Optimizer<'a> {
    plan: &'a LogicalPlan,
    config: &'a CompilerConfig,
    /// Memoized chosen output properties per operator.
    props: HashMap<OpId, PhysicalProps>,
    /// Memoized output size estimates per operator.
    stats: HashMap<OpId, Estimates>,
    /// Resolved parallelism per operator.
    dop: HashMap<OpId, usize>,
    /// Chosen ship strategy per logical edge index.
    ships: HashMap<usize, ShipStrategy>,
    vertices: Vec<PhysicalVertex>,
    decisions: Vec<PlanDecision>,
    total_cost: f64,
}

impl<'a> Optimizer<'a> {
    fn place(&mut self, id: OpId) -> Result<()> {
        let Some(op) = self.plan.operator(id) else {
            return Ok(());
        };
        let dop = self.resolve_parallelism(op);
        self.dop.insert(id, dop);

        let chosen = if !op.core().overrides.is_empty() {
            self.decisions.push(PlanDecision::OverrideApplied {
                operator: op.name().to_string(),
            });
            self.apply_overrides(id, op, dop)
        } else {
            match op {
                Operator::Source { .. } => Candidate {
                    ships: Vec::new(),
                    local: LocalStrategy::None,
                    cost: 0.0,
                },
                Operator::Sink { .. } => self.place_passthrough(id, dop),
                Operator::SingleInput { kind, .. } => match kind {
                    SingleInputKind::Map => self.place_passthrough(id, dop),
                    SingleInputKind::Reduce { key } => self.place_reduce(id, op, key, dop)?,
                },
                Operator::DualInput { kind, .. } => match kind {
                    DualInputKind::Cross => self.place_cross(id, op, dop)?,
                    DualInputKind::Join {
                        first_key,
                        second_key,
                    } => self.place_pairing(id, op, first_key, second_key, dop, true)?,
                    DualInputKind::CoGroup {
                        first_key,
                        second_key,
                    } => self.place_pairing(id, op, first_key, second_key, dop, false)?,
                },
            }
        };

        self.record_decisions(id, op, &chosen);
        self.commit(id, op, dop, chosen);
        Ok(())
    }

    /// Declared value or plan default; a single-partition requirement forces 1.
    fn resolve_parallelism(&mut self, op: &Operator) -> usize {
        if op.requires_single_partition() {
            let inherited = op
                .core()
                .parallelism
                .unwrap_or(self.config.default_parallelism);
            if inherited != 1 {
                self.decisions.push(PlanDecision::ForcedSingleParallelism {
                    operator: op.name().to_string(),
                });
            }
            return 1;
        }
        op.core()
            .parallelism
            .unwrap_or(self.config.default_parallelism)
            .max(1)
    }

    /// Operators without a data requirement: forward everything.
    fn place_passthrough(&self, id: OpId, dop: usize) -> Candidate {
        let edges = self.indexed_input_edges(id);
        let ships: Vec<(usize, ShipStrategy)> = edges
            .iter()
            .map(|(i, _)| (*i, ShipStrategy::Forward))
            .collect();
        let cost = self.ships_cost(&ships, dop);
        Candidate {
            ships,
            local: LocalStrategy::None,
            cost,
        }
    }

    fn place_reduce(
        &self,
        id: OpId,
        op: &Operator,
        key: &KeyDescriptor,
        dop: usize,
    ) -> Result<Candidate> {
        if key.is_empty() {
            return Err(CompileError::UnsatisfiableRequirement {
                operator: op.name().to_string(),
                reason: "grouping key names no fields".to_string(),
            });
        }
        let edges = self.indexed_input_edges(id);

        let mut schemes: Vec<Vec<(usize, ShipStrategy)>> = Vec::new();
        // Zero-cost reuse: keep every edge in place if that already satisfies
        // the partitioning requirement.
        let all_forward = self.all_forward(&edges);
        if self
            .slot_props(&all_forward, &edges, dop)
            .partitioned_by(key)
        {
            schemes.push(all_forward);
        }
        schemes.push(self.ships_for_target(&edges, &ShipStrategy::HashPartition(key.clone()), dop));
        schemes.push(self.ships_for_target(&edges, &ShipStrategy::RangePartition(key.clone()), dop));

        let slot_est = self.slot_estimates(&edges);
        let mut candidates = Vec::new();
        for ships in schemes {
            let arrived = self.slot_props(&ships, &edges, dop);
            let ship_cost = self.ships_cost(&ships, dop);
            for local in [
                LocalStrategy::SortMerge(key.clone()),
                LocalStrategy::HashGroup(key.clone()),
            ] {
                let local_cost = match &local {
                    LocalStrategy::SortMerge(k) => cost::sort_cost(&arrived, &slot_est, k),
                    _ => cost::hash_group_cost(&slot_est),
                };
                candidates.push(Candidate {
                    ships: ships.clone(),
                    local,
                    cost: ship_cost + local_cost,
                });
            }
        }
        pick_min(candidates).ok_or_else(|| CompileError::UnsatisfiableRequirement {
            operator: op.name().to_string(),
            reason: "no strategy establishes the required grouping".to_string(),
        })
    }

    /// Join and co-group: both sides co-partitioned by their keys, or (for
    /// join only) one side broadcast.
    fn place_pairing(
        &self,
        id: OpId,
        op: &Operator,
        first_key: &KeyDescriptor,
        second_key: &KeyDescriptor,
        dop: usize,
        broadcast_admissible: bool,
    ) -> Result<Candidate> {
        if first_key.is_empty() || second_key.is_empty() {
            return Err(CompileError::UnsatisfiableRequirement {
                operator: op.name().to_string(),
                reason: "pairing key names no fields".to_string(),
            });
        }
        let e1 = self.side_edges(id, Side::First);
        let e2 = self.side_edges(id, Side::Second);
        let est1 = self.slot_estimates(&e1);
        let est2 = self.slot_estimates(&e2);

        let mut schemes: Vec<Vec<(usize, ShipStrategy)>> = Vec::new();

        // Zero-cost reuse requires compatible co-partitioning of both sides;
        // one side alone being partitioned is not enough to co-locate keys.
        let forward1 = self.all_forward(&e1);
        let forward2 = self.all_forward(&e2);
        let sp1 = self.slot_props(&forward1, &e1, dop);
        let sp2 = self.slot_props(&forward2, &e2, dop);
        if co_partitioned(&sp1, first_key, &sp2, second_key) {
            schemes.push(join_ships(&forward1, &forward2));
        }

        let hash1 = self.ships_for_target(&e1, &ShipStrategy::HashPartition(first_key.clone()), dop);
        let hash2 =
            self.ships_for_target(&e2, &ShipStrategy::HashPartition(second_key.clone()), dop);
        schemes.push(join_ships(&hash1, &hash2));

        let range1 =
            self.ships_for_target(&e1, &ShipStrategy::RangePartition(first_key.clone()), dop);
        let range2 =
            self.ships_for_target(&e2, &ShipStrategy::RangePartition(second_key.clone()), dop);
        schemes.push(join_ships(&range1, &range2));

        if broadcast_admissible {
            schemes.push(join_ships(&self.all_broadcast(&e1), &forward2));
            schemes.push(join_ships(&forward1, &self.all_broadcast(&e2)));
        }

        let mut candidates = Vec::new();
        for ships in schemes {
            let (ships1, ships2) = split_ships(&ships, &e1);
            let arrived1 = self.slot_props(&ships1, &e1, dop);
            let arrived2 = self.slot_props(&ships2, &e2, dop);
            let ship_cost = self.ships_cost(&ships, dop);
            for local in [
                LocalStrategy::SortMerge(first_key.clone()),
                LocalStrategy::HashGroup(first_key.clone()),
            ] {
                let local_cost = match &local {
                    LocalStrategy::SortMerge(_) => cost::sort_cost(&arrived1, &est1, first_key)
                        + cost::sort_cost(&arrived2, &est2, second_key),
                    _ => cost::hash_group_cost(&est1) + cost::hash_group_cost(&est2),
                };
                candidates.push(Candidate {
                    ships: ships.clone(),
                    local,
                    cost: ship_cost + local_cost,
                });
            }
        }
        pick_min(candidates).ok_or_else(|| CompileError::UnsatisfiableRequirement {
            operator: op.name().to_string(),
            reason: "no strategy co-locates the pairing keys".to_string(),
        })
    }

    /// Cross-product: one side is broadcast, pairing is a nested loop with
    /// the cheaper (smaller-cardinality) side as the outer.
    fn place_cross(&self, id: OpId, op: &Operator, dop: usize) -> Result<Candidate> {
        let e1 = self.side_edges(id, Side::First);
        let e2 = self.side_edges(id, Side::Second);
        if e1.is_empty() || e2.is_empty() {
            // Arity is the validator's concern; without both sides there is
            // nothing to enumerate here.
            return Err(CompileError::UnsatisfiableRequirement {
                operator: op.name().to_string(),
                reason: "cross requires both inputs connected".to_string(),
            });
        }
        let est = [self.slot_estimates(&e1), self.slot_estimates(&e2)];

        let forward1 = self.all_forward(&e1);
        let forward2 = self.all_forward(&e2);
        let mut schemes: Vec<Vec<(usize, ShipStrategy)>> = Vec::new();

        // Both sides already in one partition pair completely without movement.
        let sp1 = self.slot_props(&forward1, &e1, dop);
        let sp2 = self.slot_props(&forward2, &e2, dop);
        if sp1.partitioning == Partitioning::Single && sp2.partitioning == Partitioning::Single {
            schemes.push(join_ships(&forward1, &forward2));
        }
        schemes.push(join_ships(&self.all_broadcast(&e1), &forward2));
        schemes.push(join_ships(&forward1, &self.all_broadcast(&e2)));

        let mut candidates = Vec::new();
        for ships in schemes {
            let ship_cost = self.ships_cost(&ships, dop);
            for outer in self.outer_candidates(&e1, &e2) {
                for streamed in [false, true] {
                    let local = if streamed {
                        LocalStrategy::NestedLoopStreamed(outer)
                    } else {
                        LocalStrategy::NestedLoopBlocked(outer)
                    };
                    let local_cost =
                        cost::nested_loop_cost(est[outer.index()].cardinality, streamed);
                    candidates.push(Candidate {
                        ships: ships.clone(),
                        local,
                        cost: ship_cost + local_cost,
                    });
                }
            }
        }
        pick_min(candidates).ok_or_else(|| CompileError::UnsatisfiableRequirement {
            operator: op.name().to_string(),
            reason: "no pairing strategy available".to_string(),
        })
    }

    /// Outer-side preference for nested loops: cost decides, ties go to the
    /// side with a declared cardinality hint, then to the first input.
    fn outer_candidates(&self, e1: &[(usize, Edge)], e2: &[(usize, Edge)]) -> [Side; 2] {
        let hinted = |edges: &[(usize, Edge)]| {
            edges.iter().any(|(_, e)| {
                self.plan
                    .operator(e.from)
                    .map(|op| {
                        let h = &op.core().hints;
                        h.cardinality.is_some() || h.cardinality_ratio.is_some()
                    })
                    .unwrap_or(false)
            })
        };
        if hinted(e2) && !hinted(e1) {
            [Side::Second, Side::First]
        } else {
            [Side::First, Side::Second]
        }
    }

    /// Authoritative overrides: fill unspecified parts with the canonical
    /// choice for the operator kind and skip cost comparison entirely.
    fn apply_overrides(&self, id: OpId, op: &Operator, dop: usize) -> Candidate {
        let overrides = &op.core().overrides;
        let edges = self.indexed_input_edges(id);
        let ships: Vec<(usize, ShipStrategy)> = edges
            .iter()
            .map(|(i, e)| {
                let ship = overrides
                    .ship_for(e.side)
                    .cloned()
                    .unwrap_or_else(|| self.canonical_ship(op, e));
                (*i, ship)
            })
            .collect();
        let local = overrides
            .local
            .clone()
            .unwrap_or_else(|| canonical_local(op));
        let cost = self.ships_cost(&ships, dop);
        Candidate { ships, local, cost }
    }

    /// Default ship for an edge when only part of an override is declared:
    /// reuse what is there if it satisfies the operator, else the canonical
    /// repartitioning for the kind.
    fn canonical_ship(&self, op: &Operator, edge: &Edge) -> ShipStrategy {
        let key = match op {
            Operator::SingleInput {
                kind: SingleInputKind::Reduce { key },
                ..
            } => Some(key),
            Operator::DualInput { kind, .. } => match (kind, edge.side) {
                (DualInputKind::Join { first_key, .. }, Side::First)
                | (DualInputKind::CoGroup { first_key, .. }, Side::First) => Some(first_key),
                (DualInputKind::Join { second_key, .. }, Side::Second)
                | (DualInputKind::CoGroup { second_key, .. }, Side::Second) => Some(second_key),
                (DualInputKind::Cross, Side::First) => None,
                (DualInputKind::Cross, Side::Second) => {
                    return ShipStrategy::Broadcast;
                }
            },
            _ => None,
        };
        match key {
            Some(key) => {
                let up = self.upstream_props(edge.from);
                if up.partitioned_by(key) {
                    ShipStrategy::Forward
                } else {
                    ShipStrategy::HashPartition(key.clone())
                }
            }
            None => ShipStrategy::Forward,
        }
    }

    fn record_decisions(&mut self, id: OpId, op: &Operator, chosen: &Candidate) {
        if !matches!(
            op,
            Operator::SingleInput {
                kind: SingleInputKind::Reduce { .. },
                ..
            } | Operator::DualInput { .. }
        ) {
            return;
        }
        let name = op.name().to_string();
        for side in [Side::First, Side::Second] {
            let edges = self.side_edges(id, side);
            if edges.is_empty() {
                continue;
            }
            let slot_ships: Vec<&ShipStrategy> = chosen
                .ships
                .iter()
                .filter(|(i, _)| edges.iter().any(|(j, _)| i == j))
                .map(|(_, s)| s)
                .collect();
            if slot_ships
                .iter()
                .any(|s| matches!(s, ShipStrategy::Broadcast))
            {
                self.decisions.push(PlanDecision::BroadcastSide {
                    operator: name.clone(),
                    side,
                });
            } else if slot_ships.iter().all(|s| s.is_noop()) {
                self.decisions.push(PlanDecision::ReusedPartitioning {
                    operator: name.clone(),
                    side,
                });
            } else if let Some(s) = slot_ships.iter().find(|s| !s.is_noop()) {
                self.decisions.push(PlanDecision::Repartitioned {
                    operator: name.clone(),
                    side,
                    strategy: s.label().to_string(),
                });
            }
        }
        if let Some(outer) = chosen.local.outer_side() {
            self.decisions.push(PlanDecision::OuterSide {
                operator: name,
                side: outer,
            });
        }
    }

    /// Fix the choice: account its cost, memoize output properties and
    /// estimates, and emit the physical vertex.
    fn commit(&mut self, id: OpId, op: &Operator, dop: usize, chosen: Candidate) {
        let edges = self.indexed_input_edges(id);
        let e1 = self.side_edges(id, Side::First);

        let (ships1, _) = split_ships(&chosen.ships, &e1);
        let arrived_first = self.slot_props(&ships1, &e1, dop);

        let mut output = match op {
            Operator::Source { .. } => PhysicalProps::none(),
            // Sinks emit nothing; report what arrives at them.
            Operator::Sink { .. } => arrived_first,
            _ => arrived_first
                .after_local(&chosen.local)
                .filtered_through(&op.core().semantics),
        };
        // One instance holds everything, whatever else is known.
        if dop == 1 && output.partitioning == Partitioning::None {
            output.partitioning = Partitioning::Single;
        }

        let input_est: Vec<Estimates> = match op {
            Operator::DualInput { .. } => vec![
                self.slot_estimates(&e1),
                self.slot_estimates(&self.side_edges(id, Side::Second)),
            ],
            Operator::Source { .. } => Vec::new(),
            _ => vec![self.slot_estimates(&edges)],
        };
        let est = cost::output_estimates(op, &input_est);

        debug!(
            operator = op.name(),
            local = %chosen.local,
            cost = chosen.cost,
            dop,
            "strategies selected"
        );

        self.total_cost += chosen.cost;
        for (i, ship) in &chosen.ships {
            self.ships.insert(*i, ship.clone());
        }
        self.props.insert(id, output.clone());
        self.stats.insert(id, est);
        self.vertices.push(PhysicalVertex {
            id,
            name: op.name().to_string(),
            kind: op.kind_label().to_string(),
            local: chosen.local,
            parallelism: dop,
            estimates: est,
            props: output,
        });
    }

    fn finish(self) -> PhysicalPlan {
        let edges: Vec<PhysicalEdge> = self
            .plan
            .edges()
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                self.ships.get(&i).map(|ship| PhysicalEdge {
                    from: e.from,
                    to: e.to,
                    side: e.side,
                    ship: ship.clone(),
                })
            })
            .collect();
        PhysicalPlan::new(
            self.vertices,
            edges,
            self.plan.sinks().to_vec(),
            self.total_cost,
            self.decisions,
        )
    }

    // ---------- slot helpers ----------

    fn indexed_input_edges(&self, to: OpId) -> Vec<(usize, Edge)> {
        self.plan
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.to == to)
            .map(|(i, e)| (i, *e))
            .collect()
    }

    fn side_edges(&self, to: OpId, side: Side) -> Vec<(usize, Edge)> {
        self.plan
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.to == to && e.side == side)
            .map(|(i, e)| (i, *e))
            .collect()
    }

    fn upstream_props(&self, from: OpId) -> PhysicalProps {
        self.props.get(&from).cloned().unwrap_or_else(PhysicalProps::none)
    }

    fn upstream_stats(&self, from: OpId) -> Estimates {
        self.stats.get(&from).copied().unwrap_or(Estimates {
            cardinality: cost::DEFAULT_SOURCE_CARDINALITY,
            record_bytes: cost::DEFAULT_RECORD_BYTES,
        })
    }

    fn all_forward(&self, edges: &[(usize, Edge)]) -> Vec<(usize, ShipStrategy)> {
        edges
            .iter()
            .map(|(i, _)| (*i, ShipStrategy::Forward))
            .collect()
    }

    fn all_broadcast(&self, edges: &[(usize, Edge)]) -> Vec<(usize, ShipStrategy)> {
        edges
            .iter()
            .map(|(i, _)| (*i, ShipStrategy::Broadcast))
            .collect()
    }

    /// Ships establishing a target partitioning on a slot: edges whose
    /// upstream already provides exactly the target stay `Forward`, the rest
    /// repartition. Mixing anything else would break the union's guarantee.
    fn ships_for_target(
        &self,
        edges: &[(usize, Edge)],
        target: &ShipStrategy,
        consumer_dop: usize,
    ) -> Vec<(usize, ShipStrategy)> {
        edges
            .iter()
            .map(|(i, e)| {
                let up = self.edge_arrival(e, &ShipStrategy::Forward, consumer_dop);
                let reuse = match target {
                    ShipStrategy::HashPartition(k) => {
                        up.partitioning == Partitioning::HashedBy(k.clone())
                    }
                    ShipStrategy::RangePartition(k) => {
                        up.partitioning == Partitioning::RangedBy(k.clone())
                    }
                    _ => false,
                };
                if reuse {
                    (*i, ShipStrategy::Forward)
                } else {
                    (*i, target.clone())
                }
            })
            .collect()
    }

    /// Properties arriving over one edge under a candidate ship strategy.
    ///
    /// A `Forward` between mismatched degrees of parallelism redistributes
    /// records deterministically, which voids any claimed partitioning or
    /// ordering; claiming otherwise would be unsound.
    fn edge_arrival(&self, e: &Edge, ship: &ShipStrategy, consumer_dop: usize) -> PhysicalProps {
        let producer_dop = self.dop.get(&e.from).copied().unwrap_or(consumer_dop);
        if matches!(ship, ShipStrategy::Forward) && producer_dop != consumer_dop {
            return PhysicalProps::none();
        }
        self.upstream_props(e.from).after_ship(ship)
    }

    /// The property set of a whole slot: the meet over its edges' arrivals.
    fn slot_props(
        &self,
        ships: &[(usize, ShipStrategy)],
        edges: &[(usize, Edge)],
        consumer_dop: usize,
    ) -> PhysicalProps {
        let mut acc: Option<PhysicalProps> = None;
        for (i, e) in edges {
            let arrived = match ships.iter().find(|(j, _)| j == i) {
                Some((_, ship)) => self.edge_arrival(e, ship, consumer_dop),
                None => self.edge_arrival(e, &ShipStrategy::Forward, consumer_dop),
            };
            acc = Some(match acc {
                None => arrived,
                Some(prev) => prev.meet(&arrived),
            });
        }
        acc.unwrap_or_else(PhysicalProps::none)
    }

    /// Aggregated size estimate of a slot fed by several union edges.
    fn slot_estimates(&self, edges: &[(usize, Edge)]) -> Estimates {
        let mut cardinality = 0.0;
        let mut record_bytes: f64 = 0.0;
        for (_, e) in edges {
            let est = self.upstream_stats(e.from);
            cardinality += est.cardinality;
            record_bytes = record_bytes.max(est.record_bytes);
        }
        if edges.is_empty() {
            record_bytes = cost::DEFAULT_RECORD_BYTES;
        }
        Estimates {
            cardinality,
            record_bytes,
        }
    }

    fn ships_cost(&self, ships: &[(usize, ShipStrategy)], consumer_dop: usize) -> f64 {
        ships
            .iter()
            .map(|(i, ship)| {
                let from = self.plan.edges()[*i].from;
                cost::ship_cost(ship, &self.upstream_stats(from), consumer_dop)
            })
            .sum()
    }
}

/// First strictly-cheaper candidate wins; ties keep the earlier one, so the
/// enumeration order is the tie-break order.
fn pick_min(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for c in candidates {
        let better = match &best {
            None => true,
            Some(b) => OrderedFloat(c.cost) < OrderedFloat(b.cost),
        };
        if better {
            best = Some(c);
        }
    }
    best
}

fn co_partitioned(
    p1: &PhysicalProps,
    k1: &KeyDescriptor,
    p2: &PhysicalProps,
    k2: &KeyDescriptor,
) -> bool {
    match (&p1.partitioning, &p2.partitioning) {
        (Partitioning::HashedBy(a), Partitioning::HashedBy(b)) => a == k1 && b == k2,
        (Partitioning::RangedBy(a), Partitioning::RangedBy(b)) => a == k1 && b == k2,
        (Partitioning::Single, Partitioning::Single) => true,
        _ => false,
    }
}

fn join_ships(
    a: &[(usize, ShipStrategy)],
    b: &[(usize, ShipStrategy)],
) -> Vec<(usize, ShipStrategy)> {
    let mut out = a.to_vec();
    out.extend_from_slice(b);
    out
}

/// Split a combined ship list back into (first-slot, rest) by edge index.
fn split_ships(
    ships: &[(usize, ShipStrategy)],
    first_slot: &[(usize, Edge)],
) -> (Vec<(usize, ShipStrategy)>, Vec<(usize, ShipStrategy)>) {
    let mut first = Vec::new();
    let mut rest = Vec::new();
    for (i, s) in ships {
        if first_slot.iter().any(|(j, _)| j == i) {
            first.push((*i, s.clone()));
        } else {
            rest.push((*i, s.clone()));
        }
    }
    (first, rest)
}

/// The conventional local strategy for an operator kind, used to fill the
/// gaps of a partial override.
fn canonical_local(op: &Operator) -> LocalStrategy {
    match op {
        Operator::SingleInput {
            kind: SingleInputKind::Reduce { key },
            ..
        } => LocalStrategy::SortMerge(key.clone()),
        Operator::DualInput { kind, .. } => match kind {
            DualInputKind::Join { first_key, .. } | DualInputKind::CoGroup { first_key, .. } => {
                LocalStrategy::SortMerge(first_key.clone())
            }
            DualInputKind::Cross => LocalStrategy::NestedLoopBlocked(Side::First),
        },
        _ => LocalStrategy::None,
    }
}
