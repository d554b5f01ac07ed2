//! Tests for physical property propagation and filtering.

use trestle::testing::int_key;
use trestle::*;

fn hashed(fields: &[usize]) -> PhysicalProps {
    PhysicalProps {
        partitioning: Partitioning::HashedBy(int_key(fields)),
        order: SortOrder::None,
    }
}

fn hashed_sorted(fields: &[usize]) -> PhysicalProps {
    PhysicalProps {
        partitioning: Partitioning::HashedBy(int_key(fields)),
        order: SortOrder::SortedBy(int_key(fields)),
    }
}

#[test]
fn forward_preserves_everything() {
    let props = hashed_sorted(&[0]);
    assert_eq!(props.after_ship(&ShipStrategy::Forward), props);
}

#[test]
fn broadcast_clears_partitioning_but_keeps_order() {
    let after = hashed_sorted(&[0]).after_ship(&ShipStrategy::Broadcast);
    assert_eq!(after.partitioning, Partitioning::None);
    assert_eq!(after.order, SortOrder::SortedBy(int_key(&[0])));
}

#[test]
fn repartitioning_destroys_any_previous_order() {
    let after = hashed_sorted(&[0]).after_ship(&ShipStrategy::HashPartition(int_key(&[1])));
    assert_eq!(after.partitioning, Partitioning::HashedBy(int_key(&[1])));
    assert_eq!(after.order, SortOrder::None);

    let ranged = hashed_sorted(&[0]).after_ship(&ShipStrategy::RangePartition(int_key(&[1])));
    assert_eq!(ranged.partitioning, Partitioning::RangedBy(int_key(&[1])));
    assert_eq!(ranged.order, SortOrder::None);
}

#[test]
fn sort_merge_establishes_order_and_hash_group_does_not() {
    let sorted = hashed(&[0]).after_local(&LocalStrategy::SortMerge(int_key(&[0])));
    assert!(sorted.sorted_by(&int_key(&[0])));

    let grouped = hashed_sorted(&[0]).after_local(&LocalStrategy::HashGroup(int_key(&[0])));
    assert_eq!(grouped.order, SortOrder::None);
    assert_eq!(grouped.partitioning, Partitioning::HashedBy(int_key(&[0])));
}

#[test]
fn partitioning_survives_a_key_preserving_function() {
    let semantics = SemanticProps {
        unique_key: false,
        preserved_fields: vec![0],
        constant_fields: vec![],
    };
    let after = hashed(&[0]).filtered_through(&semantics);
    assert_eq!(after.partitioning, Partitioning::HashedBy(int_key(&[0])));
}

#[test]
fn partitioning_dies_without_declared_preservation() {
    let after = hashed(&[0]).filtered_through(&SemanticProps::none());
    assert_eq!(after.partitioning, Partitioning::None);
}

#[test]
fn constant_fields_keep_partitioning_alive() {
    let semantics = SemanticProps {
        unique_key: false,
        preserved_fields: vec![],
        constant_fields: vec![0],
    };
    let after = hashed(&[0]).filtered_through(&semantics);
    assert_eq!(after.partitioning, Partitioning::HashedBy(int_key(&[0])));
}

#[test]
fn order_survives_only_a_unique_key_preserving_function() {
    let preserved_only = SemanticProps {
        unique_key: false,
        preserved_fields: vec![0],
        constant_fields: vec![],
    };
    // Several outputs per input key could interleave; sortedness is gone.
    let after = hashed_sorted(&[0]).filtered_through(&preserved_only);
    assert_eq!(after.order, SortOrder::None);

    let unique = SemanticProps {
        unique_key: true,
        preserved_fields: vec![0],
        constant_fields: vec![],
    };
    let after = hashed_sorted(&[0]).filtered_through(&unique);
    assert_eq!(after.order, SortOrder::SortedBy(int_key(&[0])));
}

#[test]
fn single_partition_survives_any_function() {
    let props = PhysicalProps {
        partitioning: Partitioning::Single,
        order: SortOrder::None,
    };
    let after = props.filtered_through(&SemanticProps::none());
    assert_eq!(after.partitioning, Partitioning::Single);
}

#[test]
fn single_partition_counts_as_partitioned_by_any_key() {
    let props = PhysicalProps {
        partitioning: Partitioning::Single,
        order: SortOrder::None,
    };
    assert!(props.partitioned_by(&int_key(&[0])));
    assert!(props.partitioned_by(&int_key(&[3, 1])));
}

#[test]
fn meet_keeps_identical_partitionings_and_drops_order() {
    let met = hashed_sorted(&[0]).meet(&hashed(&[0]));
    assert_eq!(met.partitioning, Partitioning::HashedBy(int_key(&[0])));
    // A union of sorted streams is not sorted without a merge step.
    assert_eq!(met.order, SortOrder::None);
}

#[test]
fn meet_of_different_partitionings_is_none() {
    let met = hashed(&[0]).meet(&hashed(&[1]));
    assert_eq!(met.partitioning, Partitioning::None);

    let single = PhysicalProps {
        partitioning: Partitioning::Single,
        order: SortOrder::None,
    };
    // One side in a single partition, the other spread by hash: the union
    // co-locates nothing.
    assert_eq!(single.meet(&hashed(&[0])).partitioning, Partitioning::None);
}
