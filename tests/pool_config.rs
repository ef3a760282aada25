//! Configuration string parser integration tests
//!
//! Exercises the operator-string grammar end to end, including the lenient
//! degradation rules for malformed input.

use std::sync::Arc;

use disjoint_pool::config::{PoolConfigurations, PoolDescriptor};

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

fn params(
    configs: &PoolConfigurations,
    descriptor: PoolDescriptor,
) -> (usize, usize, usize, usize) {
    let config = configs.get(&descriptor).expect("descriptor configured");
    (
        config.max_poolable_size,
        config.capacity,
        config.slab_min_size,
        config.limits.max_size,
    )
}

#[test]
fn full_string_configures_every_kind() {
    let configs = PoolConfigurations::parse(
        "1;32M;host:1M,4,64k;device:1m,4,64K;shared:0,3,1M;read_only_shared:0,0,3M",
    );
    assert_eq!(configs.len(), 4);

    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (MIB, 4, 64 * KIB, 32 * MIB)
    );
    assert_eq!(
        params(&configs, PoolDescriptor::device()),
        (MIB, 4, 64 * KIB, 32 * MIB)
    );
    assert_eq!(
        params(&configs, PoolDescriptor::shared()),
        (0, 3, MIB, 32 * MIB)
    );
    assert_eq!(
        params(&configs, PoolDescriptor::read_only_shared()),
        (0, 0, 3 * MIB, 32 * MIB)
    );
}

#[test]
fn disabled_flag_yields_no_pools() {
    let configs = PoolConfigurations::parse("0;32M;host:1M,4,64k");
    assert!(configs.is_empty());
    assert!(configs.get(&PoolDescriptor::host()).is_none());
}

#[test]
fn empty_string_yields_builtin_defaults() {
    let configs = PoolConfigurations::parse("");
    assert_eq!(configs.len(), 4);

    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (2 * MIB, 4, 64 * KIB, 16 * MIB)
    );
    assert_eq!(
        params(&configs, PoolDescriptor::device()),
        (4 * MIB, 4, 64 * KIB, 16 * MIB)
    );
    assert_eq!(
        params(&configs, PoolDescriptor::shared()),
        (0, 0, 2 * MIB, 16 * MIB)
    );
    assert_eq!(
        params(&configs, PoolDescriptor::read_only_shared()),
        (4 * MIB, 4, 2 * MIB, 16 * MIB)
    );
}

#[test]
fn empty_max_size_field_uses_larger_default() {
    let configs = PoolConfigurations::parse("1;");
    let (_, _, _, max_size) = params(&configs, PoolDescriptor::host());
    assert_eq!(max_size, 32 * MIB);
}

#[test]
fn malformed_max_size_falls_back_to_default() {
    let configs = PoolConfigurations::parse("1;banana;host:1M,4,64k");
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (MIB, 4, 64 * KIB, 16 * MIB)
    );
}

#[test]
fn partial_kind_segment_keeps_remaining_defaults() {
    let configs = PoolConfigurations::parse("1;32M;host:1M");
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (MIB, 4, 64 * KIB, 32 * MIB)
    );
    // Untouched kinds keep their built-in values under the parsed budget.
    assert_eq!(
        params(&configs, PoolDescriptor::device()),
        (4 * MIB, 4, 64 * KIB, 32 * MIB)
    );
}

#[test]
fn garbage_input_degrades_to_defaults() {
    let configs = PoolConfigurations::parse("ab12cdefghi34jk56lmn78opr910");
    assert_eq!(configs.len(), 4);
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (2 * MIB, 4, 64 * KIB, 16 * MIB)
    );
}

#[test]
fn negative_flag_leaves_pooling_enabled() {
    let configs = PoolConfigurations::parse("-5;32M;host:1M,4,64k");
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (MIB, 4, 64 * KIB, 32 * MIB)
    );
}

#[test]
fn unknown_kind_segment_is_dropped() {
    let configs = PoolConfigurations::parse("1;32M;foo:1M,4,64k");
    assert_eq!(configs.len(), 4);
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (2 * MIB, 4, 64 * KIB, 32 * MIB)
    );
}

#[test]
fn extra_fields_are_ignored() {
    let configs = PoolConfigurations::parse("1;32M;host:1M,4,64k,999,banana");
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (MIB, 4, 64 * KIB, 32 * MIB)
    );
}

#[test]
fn malformed_fields_keep_defaults_per_field() {
    let configs = PoolConfigurations::parse("1;32M;host:oops,7,64k");
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (2 * MIB, 7, 64 * KIB, 32 * MIB)
    );
}

#[test]
fn all_entries_share_one_budget() {
    let configs = PoolConfigurations::parse("1;32M;host:1M,4,64k;device:1M,4,64k");
    let host = configs.get(&PoolDescriptor::host()).unwrap();
    let device = configs.get(&PoolDescriptor::device()).unwrap();
    let shared = configs.get(&PoolDescriptor::shared()).unwrap();
    assert!(Arc::ptr_eq(&host.limits, &device.limits));
    assert!(Arc::ptr_eq(&host.limits, &shared.limits));
}

#[test]
fn one_entry_per_descriptor() {
    // A repeated kind overrides in place rather than adding an entry.
    let configs = PoolConfigurations::parse("1;32M;host:1M,4,64k;host:2M,8,128k");
    assert_eq!(configs.len(), 4);
    assert_eq!(
        params(&configs, PoolDescriptor::host()),
        (2 * MIB, 8, 128 * KIB, 32 * MIB)
    );
}
