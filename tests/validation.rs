//! Tests for plan well-formedness checking.

use trestle::testing::*;
use trestle::*;

/// A diamond-shaped plan: one source feeding two maps joined back together.
fn diamond() -> LogicalPlan {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let left = p.add(map_op("left"));
    let right = p.add(map_op("right"));
    let join = p.add(join_op("pair", int_key(&[0]), int_key(&[0])));
    let out = p.add(sink_op("out"));
    p.connect(src, left);
    p.connect(src, right);
    p.connect_side(left, join, Side::First);
    p.connect_side(right, join, Side::Second);
    p.connect(join, out);
    p.build()
}

#[test]
fn valid_plan_passes() {
    let plan = diamond();
    assert!(validate(&plan).is_ok());
}

#[test]
fn revalidation_is_idempotent_and_visits_each_operator_once() {
    let plan = diamond();

    // The shared source is reached through two paths but checked only once.
    let first = validate_counted(&plan).unwrap();
    let second = validate_counted(&plan).unwrap();

    assert_eq!(first, plan.op_count());
    assert_eq!(second, plan.op_count());
}

#[test]
fn unreachable_operators_are_not_visited() {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let out = p.add(sink_op("out"));
    p.add(map_op("orphan"));
    p.connect(src, out);

    let visited = validate_counted(&p.build()).unwrap();
    assert_eq!(visited, 2);
}

#[test]
fn single_input_operator_without_input_fails() {
    let mut p = TestPlan::new();
    let red = p.add(reduce_op("count", int_key(&[0])));
    let out = p.add(sink_op("out"));
    p.connect(red, out);

    let err = validate(&p.build()).unwrap_err();
    match err {
        CompileError::MissingInput { operator } => assert_eq!(operator, "count"),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn dual_input_operator_with_one_side_connected_fails() {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let join = p.add(join_op("pair", int_key(&[0]), int_key(&[0])));
    let out = p.add(sink_op("out"));
    p.connect_side(src, join, Side::First);
    p.connect(join, out);

    let err = validate(&p.build()).unwrap_err();
    match err {
        CompileError::MissingInput { operator } => assert_eq!(operator, "pair"),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn sink_without_producer_fails_naming_the_sink() {
    let mut p = TestPlan::new();
    p.add(source_op("in"));
    p.add(sink_op("out"));

    let err = validate(&p.build()).unwrap_err();
    match err {
        CompileError::MissingInput { operator } => assert_eq!(operator, "out"),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn empty_location_is_rejected() {
    let mut p = TestPlan::new();
    let src = p.add(Operator::source("in", "", "records"));
    let out = p.add(sink_op("out"));
    p.connect(src, out);

    let err = validate(&p.build()).unwrap_err();
    match err {
        CompileError::InvalidLocation { operator, location } => {
            assert_eq!(operator, "in");
            assert_eq!(location, "");
        }
        other => panic!("expected InvalidLocation, got {other:?}"),
    }
}

#[test]
fn scheme_less_location_is_rejected() {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let out = p.add(Operator::sink("out", "not-a-uri"));
    p.connect(src, out);

    let err = validate(&p.build()).unwrap_err();
    match err {
        CompileError::InvalidLocation { operator, .. } => assert_eq!(operator, "out"),
        other => panic!("expected InvalidLocation, got {other:?}"),
    }
}

#[test]
fn file_and_hdfs_schemes_are_accepted() {
    let mut p = TestPlan::new();
    let src = p.add(Operator::source("in", "file:///tmp/x", "records"));
    let out = p.add(Operator::sink("out", "hdfs:///tmp/x"));
    p.connect(src, out);

    assert!(validate(&p.build()).is_ok());
}

#[test]
fn cycle_is_detected_as_cyclic_not_missing_input() {
    let mut p = TestPlan::new();
    let a = p.add(map_op("a"));
    let b = p.add(map_op("b"));
    let out = p.add(sink_op("out"));
    p.connect(a, b);
    p.connect(b, a);
    p.connect(b, out);

    let err = validate(&p.build()).unwrap_err();
    assert!(
        matches!(err, CompileError::CyclicPlan { .. }),
        "expected CyclicPlan, got {err:?}"
    );
}

#[test]
fn validation_failure_stops_compilation() {
    let mut p = TestPlan::new();
    p.add(source_op("in"));
    p.add(sink_op("out"));

    // compile() runs the validator first; the optimizer is never reached.
    let err = compile(&p.build(), &CompilerConfig::with_default_parallelism(2)).unwrap_err();
    assert!(matches!(err, CompileError::MissingInput { .. }));
}
