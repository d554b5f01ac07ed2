//! # Trestle
//!
//! A **plan compiler** for distributed dataflow DAGs. Trestle takes a
//! declarative graph of second-order operators — map-like, reduce-like,
//! join-like, cross-product, and source/sink operators parameterized by
//! first-order user functions — and turns it into a physical execution plan:
//! the same DAG annotated with data-movement strategies (how records travel
//! between operators) and local-execution strategies (how each operator
//! consumes its input), then lowers that plan into an executable task graph
//! for an external runtime.
//!
//! ## Key Features
//!
//! - **Plan validation** - certifies arity and location well-formedness
//!   before any optimization work is attempted
//! - **Property propagation** - tracks the partitioning and ordering already
//!   guaranteed by upstream strategies
//! - **Semantic properties** - declared user-function guarantees (key
//!   preservation, uniqueness) keep upstream work alive across operators
//! - **Cost-based strategy selection** - forward, broadcast, hash- and
//!   range-partitioning per edge; sort-merge, hash grouping and nested-loop
//!   pairing per operator
//! - **Deterministic compilation** - ties break by declaration order, so an
//!   unchanged plan always compiles to the same physical plan
//! - **Task-graph lowering** - task groups and typed channels, serializable
//!   for hand-off to the runtime
//!
//! ## Quick Start
//!
//! ```ignore
//! use trestle::*;
//!
//! // Assemble a logical plan
//! let mut b = PlanBuilder::new();
//! let src = b.add(Operator::source("lines", "file:///data/in", "text"));
//! let counts = b.add(Operator::reduce(
//!     "count",
//!     "count_fn",
//!     KeyDescriptor::new(vec![0], KeyType::Text),
//! ));
//! let out = b.add(Operator::sink("out", "hdfs:///data/out").with_single_partition());
//! b.connect(src, counts);
//! b.connect(counts, out);
//! let plan = b.build();
//!
//! // Compile: validate, optimize, emit
//! let physical = compile(&plan, &CompilerConfig::default())?;
//! println!("{}", physical.explain());
//!
//! // Lower for the runtime
//! let tasks = build_task_graph(&physical);
//! # Ok::<(), trestle::CompileError>(())
//! ```
//!
//! ## Core Concepts
//!
//! ### Logical plan
//!
//! A [`PlanBuilder`] assembles [`Operator`]s into an immutable
//! [`LogicalPlan`]: an arena of operators addressed by [`OpId`], connected
//! by explicit edges. Multiple edges into one input slot carry union
//! semantics. The compiler consumes the plan by reference and never mutates
//! it.
//!
//! ### Validation
//!
//! [`validate`] walks the DAG once from its sinks and fails fast on the
//! first arity violation, malformed location descriptor, or cycle. Nothing
//! is optimized past a validation failure.
//!
//! ### Optimization
//!
//! [`optimize`] processes operators in topological order. For each operator
//! it derives a data requirement from the operator kind, enumerates the
//! admissible ship/local strategy combinations — always including the
//! zero-cost option of reusing what upstream already guarantees — and keeps
//! the cheapest. Declared [`SemanticProps`] let a partitioning or ordering
//! survive through an operator that strategy alone could not justify.
//!
//! ### Physical plan and task graph
//!
//! The [`PhysicalPlan`] is isomorphic to the logical plan, carries every
//! chosen strategy and resolved parallelism, and renders a readable report
//! via [`PhysicalPlan::explain`]. [`build_task_graph`] lowers it into
//! [`TaskGraph`] task groups and typed channels for the external runtime.
//!
//! ## Module Overview
//!
//! - [`plan`] - plan assembly and the immutable operator arena
//! - [`operator`] - operator variants, semantic properties, compiler hints
//! - [`validate`] - well-formedness checking
//! - [`properties`] - physical property sets and propagation rules
//! - [`optimizer`] - strategy enumeration and minimum-cost selection
//! - [`cost`] - the additive cost model
//! - [`physical`] - the emitted physical plan
//! - [`taskgraph`] - lowering to task groups and channels
//! - [`alloc`] - the instance-allocation notification contract
//! - [`testing`] - plan-assembly helpers for tests

pub mod alloc;
pub mod cost;
pub mod error;
pub mod key;
pub mod op_id;
pub mod operator;
pub mod optimizer;
pub mod physical;
pub mod plan;
pub mod properties;
pub mod strategy;
pub mod taskgraph;
pub mod testing;
pub mod validate;

// General re-exports
pub use alloc::{AllocationTicket, InstanceDescriptor, InstanceNotifier, RequestId};
pub use cost::Estimates;
pub use error::{CompileError, Result};
pub use key::{KeyDescriptor, KeyType};
pub use op_id::OpId;
pub use operator::{
    CostHints, DualInputKind, Operator, OperatorCore, SemanticProps, SingleInputKind,
    StrategyOverrides,
};
pub use optimizer::{CompilerConfig, compile, optimize};
pub use physical::{PhysicalEdge, PhysicalPlan, PhysicalVertex, PlanDecision};
pub use plan::{Edge, LogicalPlan, PlanBuilder};
pub use properties::{Partitioning, PhysicalProps, SortOrder};
pub use strategy::{LocalStrategy, ShipStrategy, Side};
pub use taskgraph::{
    Channel, ChannelKind, PartitionScheme, TaskGraph, TaskGroup, TaskGroupId, build_task_graph,
};
pub use validate::{validate, validate_counted};
