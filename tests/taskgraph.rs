//! Tests for the task-graph lowering.

use trestle::testing::*;
use trestle::*;

fn config4() -> CompilerConfig {
    CompilerConfig::with_default_parallelism(4)
}

fn channel_between<'a>(graph: &'a TaskGraph, from: OpId, to: OpId) -> &'a ChannelKind {
    let from = graph.group_for(from).unwrap().id;
    let to = graph.group_for(to).unwrap().id;
    &graph
        .channels
        .iter()
        .find(|c| c.from == from && c.to == to)
        .expect("channel not found")
        .kind
}

#[test]
fn end_to_end_grouping_plan_lowers_to_the_expected_channels() {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let red = p.add(reduce_op("count", int_key(&[0])));
    let out = p.add(sink_op("out").with_single_partition());
    p.connect(src, red);
    p.connect(red, out);

    let physical = compile(&p.build(), &config4()).unwrap();
    let graph = build_task_graph(&physical);

    assert_eq!(graph.groups.len(), 3);
    assert_eq!(graph.channels.len(), 2);

    // The shuffle into the grouping becomes a hash-partitioned channel set.
    assert_eq!(
        *channel_between(&graph, src, red),
        ChannelKind::Partitioned {
            scheme: PartitionScheme::Hash,
            key: int_key(&[0]),
        }
    );
    // Forward from 4 instances into the single-partition sink must re-spread.
    assert_eq!(*channel_between(&graph, red, out), ChannelKind::Redistribute);

    assert_eq!(graph.group_for(red).unwrap().parallelism, 4);
    assert_eq!(graph.group_for(out).unwrap().parallelism, 1);
}

#[test]
fn forward_between_equal_parallelism_is_one_to_one() {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let map = p.add(map_op("ident"));
    let out = p.add(sink_op("out"));
    p.connect(src, map);
    p.connect(map, out);

    let physical = compile(&p.build(), &config4()).unwrap();
    let graph = build_task_graph(&physical);

    assert_eq!(*channel_between(&graph, src, map), ChannelKind::OneToOne);
    assert_eq!(*channel_between(&graph, map, out), ChannelKind::OneToOne);
}

#[test]
fn broadcast_lowers_to_all_to_all() {
    let mut p = TestPlan::new();
    let small = p.add(source_op("small").with_hints(CostHints {
        cardinality: Some(10.0),
        ..CostHints::default()
    }));
    let large = p.add(source_op("large").with_hints(CostHints {
        cardinality: Some(100_000.0),
        ..CostHints::default()
    }));
    let join = p.add(join_op("pair", int_key(&[0]), int_key(&[0])));
    let out = p.add(sink_op("out"));
    p.connect_side(small, join, Side::First);
    p.connect_side(large, join, Side::Second);
    p.connect(join, out);

    let physical = compile(&p.build(), &config4()).unwrap();
    let graph = build_task_graph(&physical);

    assert_eq!(*channel_between(&graph, small, join), ChannelKind::AllToAll);
    assert_eq!(*channel_between(&graph, large, join), ChannelKind::OneToOne);
}

#[test]
fn channels_carry_the_feeding_side() {
    let mut p = TestPlan::new();
    let a = p.add(source_op("a"));
    let b = p.add(source_op("b"));
    let cg = p.add(cogroup_op("groups", int_key(&[0]), int_key(&[1])));
    let out = p.add(sink_op("out"));
    p.connect_side(a, cg, Side::First);
    p.connect_side(b, cg, Side::Second);
    p.connect(cg, out);

    let physical = compile(&p.build(), &config4()).unwrap();
    let graph = build_task_graph(&physical);

    let first = graph
        .channels
        .iter()
        .find(|c| c.side == Side::First && c.to == graph.group_for(cg).unwrap().id)
        .unwrap();
    let second = graph
        .channels
        .iter()
        .find(|c| c.side == Side::Second && c.to == graph.group_for(cg).unwrap().id)
        .unwrap();

    assert_eq!(
        first.kind,
        ChannelKind::Partitioned {
            scheme: PartitionScheme::Hash,
            key: int_key(&[0]),
        }
    );
    assert_eq!(
        second.kind,
        ChannelKind::Partitioned {
            scheme: PartitionScheme::Hash,
            key: int_key(&[1]),
        }
    );
}

#[test]
fn task_graph_serializes_to_json() {
    let mut p = TestPlan::new();
    let src = p.add(source_op("in"));
    let red = p.add(reduce_op("count", int_key(&[0])));
    let out = p.add(sink_op("out"));
    p.connect(src, red);
    p.connect(red, out);

    let physical = compile(&p.build(), &config4()).unwrap();
    let graph = build_task_graph(&physical);

    let json = graph.to_json().unwrap();
    assert!(json.contains("\"count\""));
    assert!(json.contains("Partitioned"));
}
