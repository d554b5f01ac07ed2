//! Testing utilities for plan assembly.
//!
//! This module provides a small facility for writing idiomatic tests against
//! the compiler: canned operators with valid defaults, key-descriptor
//! shorthand, and a [`TestPlan`] wrapper exposing graph counts.
//!
//! # Quick Start
//!
//! ```no_run
//! use trestle::*;
//! use trestle::testing::*;
//!
//! let mut plan = TestPlan::new();
//! let src = plan.add(source_op("in"));
//! let red = plan.add(reduce_op("count", int_key(&[0])));
//! let out = plan.add(sink_op("out"));
//! plan.connect(src, red);
//! plan.connect(red, out);
//!
//! let physical = compile(&plan.build(), &CompilerConfig::with_default_parallelism(4)).unwrap();
//! assert_eq!(physical.vertices().len(), 3);
//! ```

use crate::key::{KeyDescriptor, KeyType};
use crate::op_id::OpId;
use crate::operator::{Operator, SemanticProps};
use crate::plan::{LogicalPlan, PlanBuilder};
use crate::strategy::Side;

/// A test-focused wrapper around [`PlanBuilder`] with graph counters.
#[derive(Default)]
pub struct TestPlan {
    builder: PlanBuilder,
    ops: usize,
    edges: usize,
}

impl TestPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, op: Operator) -> OpId {
        self.ops += 1;
        self.builder.add(op)
    }

    pub fn connect(&mut self, from: OpId, to: OpId) {
        self.edges += 1;
        self.builder.connect(from, to);
    }

    pub fn connect_side(&mut self, from: OpId, to: OpId, side: Side) {
        self.edges += 1;
        self.builder.connect_side(from, to, side);
    }

    /// Number of operators added so far.
    #[must_use]
    pub fn op_count(&self) -> usize {
        self.ops
    }

    /// Number of edges connected so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn build(self) -> LogicalPlan {
        self.builder.build()
    }
}

/// An integer key over the given field positions.
pub fn int_key(fields: &[usize]) -> KeyDescriptor {
    KeyDescriptor::new(fields.to_vec(), KeyType::Int)
}

/// A source with a valid local-filesystem location.
pub fn source_op(name: &str) -> Operator {
    Operator::source(name, format!("file:///tmp/{name}"), "records")
}

/// A sink with a valid local-filesystem location.
pub fn sink_op(name: &str) -> Operator {
    Operator::sink(name, format!("file:///tmp/{name}"))
}

/// A map with no declared guarantees.
pub fn map_op(name: &str) -> Operator {
    Operator::map(name, format!("{name}_fn"))
}

/// A reduce over `key` with no declared guarantees.
pub fn reduce_op(name: &str, key: KeyDescriptor) -> Operator {
    Operator::reduce(name, format!("{name}_fn"), key)
}

/// A reduce whose function keeps the key fields stable and emits one record
/// per group — the shape that licenses downstream partitioning reuse.
pub fn key_preserving_reduce_op(name: &str, key: KeyDescriptor) -> Operator {
    let preserved = key.fields().to_vec();
    Operator::reduce(name, format!("{name}_fn"), key).with_semantics(SemanticProps {
        unique_key: true,
        preserved_fields: preserved,
        constant_fields: Vec::new(),
    })
}

/// A join on `first_key` = `second_key` with no declared guarantees.
pub fn join_op(name: &str, first_key: KeyDescriptor, second_key: KeyDescriptor) -> Operator {
    Operator::join(name, format!("{name}_fn"), first_key, second_key)
}

/// A cross product with no declared guarantees.
pub fn cross_op(name: &str) -> Operator {
    Operator::cross(name, format!("{name}_fn"))
}

/// A co-group on `first_key` / `second_key` with no declared guarantees.
pub fn cogroup_op(name: &str, first_key: KeyDescriptor, second_key: KeyDescriptor) -> Operator {
    Operator::cogroup(name, format!("{name}_fn"), first_key, second_key)
}
