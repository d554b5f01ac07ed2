//! Operator variants and their declared metadata.
//!
//! An [`Operator`] is a node of the logical DAG: a second-order transformation
//! parameterized by a first-order user function, referenced here by name only
//! (the compiler never calls it). The closed set of variants is matched
//! structurally throughout the crate; there is no reflection and no dynamic
//! dispatch over operator kinds.
//!
//! Each operator carries an [`OperatorCore`] with its display name, declared
//! degree of parallelism, the [`SemanticProps`] capability record of its user
//! function, optional [`CostHints`], and optional [`StrategyOverrides`]. The
//! capability record is what licenses the optimizer to keep an upstream
//! partitioning or ordering alive across the operator instead of re-shuffling.

use crate::key::KeyDescriptor;
use crate::strategy::{LocalStrategy, ShipStrategy, Side};

/// Declared guarantees of an operator's user function.
///
/// All fields default to "no guarantee". Field positions refer to the
/// operator's first input (the only input for single-input operators).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemanticProps {
    /// The function emits at most one record per distinct input key.
    pub unique_key: bool,
    /// Input fields passed through to the output unchanged.
    pub preserved_fields: Vec<usize>,
    /// Output fields holding the same value across all emitted records.
    pub constant_fields: Vec<usize>,
}

impl SemanticProps {
    /// No guarantees at all; the optimizer must assume the function rewrites
    /// every field.
    pub fn none() -> Self {
        Self::default()
    }

    /// True if every one of `fields` is declared preserved.
    pub fn preserves_all(&self, fields: &[usize]) -> bool {
        fields.iter().all(|f| self.preserved_fields.contains(f))
    }

    /// True if every one of `fields` is declared preserved or constant.
    pub fn keeps_stable(&self, fields: &[usize]) -> bool {
        fields
            .iter()
            .all(|f| self.preserved_fields.contains(f) || self.constant_fields.contains(f))
    }
}

/// Optional numeric estimates supplied by the plan assembler.
///
/// Absent hints fall back to crate defaults during costing; they never fail
/// compilation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CostHints {
    /// Estimated average size of one output record, in bytes.
    pub avg_record_bytes: Option<f64>,
    /// Estimated output/input cardinality ratio.
    pub cardinality_ratio: Option<f64>,
    /// Estimated record count produced by a source.
    pub cardinality: Option<f64>,
}

/// Authoritative strategy choices for testing and tuning.
///
/// When present, an override bypasses cost comparison for that edge or
/// operator entirely.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrategyOverrides {
    /// Forced ship strategy for the first (or only) input slot.
    pub ship_first: Option<ShipStrategy>,
    /// Forced ship strategy for the second input slot.
    pub ship_second: Option<ShipStrategy>,
    /// Forced local strategy.
    pub local: Option<LocalStrategy>,
}

impl StrategyOverrides {
    pub fn is_empty(&self) -> bool {
        self.ship_first.is_none() && self.ship_second.is_none() && self.local.is_none()
    }

    pub fn ship_for(&self, side: Side) -> Option<&ShipStrategy> {
        match side {
            Side::First => self.ship_first.as_ref(),
            Side::Second => self.ship_second.as_ref(),
        }
    }
}

/// Metadata shared by every operator variant.
#[derive(Clone, Debug)]
pub struct OperatorCore {
    /// Display name, used in diagnostics and errors.
    pub name: String,
    /// Declared degree of parallelism; `None` inherits the plan-wide default.
    pub parallelism: Option<usize>,
    pub semantics: SemanticProps,
    pub hints: CostHints,
    pub overrides: StrategyOverrides,
}

impl OperatorCore {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parallelism: None,
            semantics: SemanticProps::none(),
            hints: CostHints::default(),
            overrides: StrategyOverrides::default(),
        }
    }
}

/// The shape of a single-input operator.
#[derive(Clone, Debug)]
pub enum SingleInputKind {
    /// Record-at-a-time transformation; no data requirement.
    Map,
    /// Group-at-a-time transformation over the given key.
    Reduce { key: KeyDescriptor },
}

/// The shape of a dual-input operator.
#[derive(Clone, Debug)]
pub enum DualInputKind {
    /// Cartesian pairing of the two inputs.
    Cross,
    /// Key-equality pairing; the function sees one pair per key match.
    Join {
        first_key: KeyDescriptor,
        second_key: KeyDescriptor,
    },
    /// Key grouping on both sides; the function sees both groups per key.
    CoGroup {
        first_key: KeyDescriptor,
        second_key: KeyDescriptor,
    },
}

/// A node of the logical DAG.
#[derive(Clone, Debug)]
pub enum Operator {
    Source {
        core: OperatorCore,
        /// URI-like location descriptor, e.g. `file:///data/in`.
        location: String,
        /// Name of the record format used to read the source.
        format: String,
    },
    Sink {
        core: OperatorCore,
        location: String,
        /// The sink must receive all data in a single partition (forces its
        /// parallelism to 1).
        single_partition: bool,
    },
    SingleInput {
        core: OperatorCore,
        /// Name of the first-order user function.
        udf: String,
        kind: SingleInputKind,
    },
    DualInput {
        core: OperatorCore,
        udf: String,
        kind: DualInputKind,
    },
}

impl Operator {
    pub fn source(
        name: impl Into<String>,
        location: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Operator::Source {
            core: OperatorCore::named(name),
            location: location.into(),
            format: format.into(),
        }
    }

    pub fn sink(name: impl Into<String>, location: impl Into<String>) -> Self {
        Operator::Sink {
            core: OperatorCore::named(name),
            location: location.into(),
            single_partition: false,
        }
    }

    pub fn map(name: impl Into<String>, udf: impl Into<String>) -> Self {
        Operator::SingleInput {
            core: OperatorCore::named(name),
            udf: udf.into(),
            kind: SingleInputKind::Map,
        }
    }

    pub fn reduce(name: impl Into<String>, udf: impl Into<String>, key: KeyDescriptor) -> Self {
        Operator::SingleInput {
            core: OperatorCore::named(name),
            udf: udf.into(),
            kind: SingleInputKind::Reduce { key },
        }
    }

    pub fn cross(name: impl Into<String>, udf: impl Into<String>) -> Self {
        Operator::DualInput {
            core: OperatorCore::named(name),
            udf: udf.into(),
            kind: DualInputKind::Cross,
        }
    }

    pub fn join(
        name: impl Into<String>,
        udf: impl Into<String>,
        first_key: KeyDescriptor,
        second_key: KeyDescriptor,
    ) -> Self {
        Operator::DualInput {
            core: OperatorCore::named(name),
            udf: udf.into(),
            kind: DualInputKind::Join {
                first_key,
                second_key,
            },
        }
    }

    pub fn cogroup(
        name: impl Into<String>,
        udf: impl Into<String>,
        first_key: KeyDescriptor,
        second_key: KeyDescriptor,
    ) -> Self {
        Operator::DualInput {
            core: OperatorCore::named(name),
            udf: udf.into(),
            kind: DualInputKind::CoGroup {
                first_key,
                second_key,
            },
        }
    }

    /// Builder-style: set the declared degree of parallelism.
    pub fn with_parallelism(mut self, dop: usize) -> Self {
        self.core_mut().parallelism = Some(dop.max(1));
        self
    }

    /// Builder-style: attach the user function's capability record.
    pub fn with_semantics(mut self, semantics: SemanticProps) -> Self {
        self.core_mut().semantics = semantics;
        self
    }

    /// Builder-style: attach cost hints.
    pub fn with_hints(mut self, hints: CostHints) -> Self {
        self.core_mut().hints = hints;
        self
    }

    /// Builder-style: attach authoritative strategy overrides.
    pub fn with_overrides(mut self, overrides: StrategyOverrides) -> Self {
        self.core_mut().overrides = overrides;
        self
    }

    /// Builder-style: require all data in one partition (sinks only; ignored
    /// for other variants).
    pub fn with_single_partition(mut self) -> Self {
        if let Operator::Sink {
            single_partition, ..
        } = &mut self
        {
            *single_partition = true;
        }
        self
    }

    pub fn core(&self) -> &OperatorCore {
        match self {
            Operator::Source { core, .. }
            | Operator::Sink { core, .. }
            | Operator::SingleInput { core, .. }
            | Operator::DualInput { core, .. } => core,
        }
    }

    fn core_mut(&mut self) -> &mut OperatorCore {
        match self {
            Operator::Source { core, .. }
            | Operator::Sink { core, .. }
            | Operator::SingleInput { core, .. }
            | Operator::DualInput { core, .. } => core,
        }
    }

    pub fn name(&self) -> &str {
        &self.core().name
    }

    /// Short kind label for diagnostics and the explain report.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Operator::Source { .. } => "Source",
            Operator::Sink { .. } => "Sink",
            Operator::SingleInput { kind, .. } => match kind {
                SingleInputKind::Map => "Map",
                SingleInputKind::Reduce { .. } => "Reduce",
            },
            Operator::DualInput { kind, .. } => match kind {
                DualInputKind::Cross => "Cross",
                DualInputKind::Join { .. } => "Join",
                DualInputKind::CoGroup { .. } => "CoGroup",
            },
        }
    }

    /// True for operators that consume exactly one input slot.
    pub fn is_single_input(&self) -> bool {
        matches!(self, Operator::SingleInput { .. } | Operator::Sink { .. })
    }

    pub fn is_dual_input(&self) -> bool {
        matches!(self, Operator::DualInput { .. })
    }

    /// True when every record must reach one single partition (forces
    /// parallelism 1).
    pub fn requires_single_partition(&self) -> bool {
        matches!(
            self,
            Operator::Sink {
                single_partition: true,
                ..
            }
        )
    }
}
