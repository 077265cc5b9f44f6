//! Stage B: statistical refinement of Stage A.
//!
//! Name-derived identities overcount when several queues belong to one
//! device, so Stage B keeps only counts and replaces the identities with
//! sequential placeholders. The formulas are tuned to the deployment's
//! expected fleet size; only the ceilings are configurable.

use std::collections::{BTreeSet, HashSet};

use oceanwatch_types::{FleetCeiling, Role, Snapshot};

/// Counts estimated from connection and consumer metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub sensor_units: usize,
    pub aggregators: usize,
    /// Distinct connections backing at least one consumer.
    pub consumer_connections: usize,
    /// Connections backing no consumer (assumed publish-only aggregator links).
    pub publish_only_connections: usize,
    pub channels_with_consumers: usize,
    pub channels_without_consumers: usize,
}

impl Estimate {
    /// Estimate counts from a full snapshot and the number of distinct
    /// anonymous consumer queues Stage A found.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        anonymous_consumer_queues: usize,
        ceiling: &FleetCeiling,
    ) -> Self {
        let consumer_connections = snapshot
            .consumers
            .iter()
            .filter_map(|c| c.connection_name.as_deref())
            .collect::<HashSet<_>>()
            .len();

        let publish_only_connections = snapshot
            .connections
            .len()
            .saturating_sub(consumer_connections);

        let channels_with_consumers = snapshot.channels_with_consumers();

        Self {
            sensor_units: estimate_sensor_units(
                anonymous_consumer_queues,
                ceiling.for_role(Role::SensorUnit),
            ),
            aggregators: estimate_aggregators(
                publish_only_connections,
                ceiling.for_role(Role::Aggregator),
            ),
            consumer_connections,
            publish_only_connections,
            channels_with_consumers,
            channels_without_consumers: snapshot.channels.len() - channels_with_consumers,
        }
    }

    /// Count for one role.
    pub fn count(&self, role: Role) -> usize {
        match role {
            Role::SensorUnit => self.sensor_units,
            Role::Aggregator => self.aggregators,
        }
    }
}

/// At least one sensor unit is assumed whenever Stage B runs; each anonymous
/// consumer queue counts as one unit.
pub fn estimate_sensor_units(anonymous_consumer_queues: usize, ceiling: usize) -> usize {
    let mut estimate = ceiling.min(anonymous_consumer_queues.max(1));
    if anonymous_consumer_queues > ceiling {
        estimate = ceiling;
    }
    estimate
}

pub fn estimate_aggregators(publish_only_connections: usize, ceiling: usize) -> usize {
    ceiling.min(publish_only_connections)
}

/// Sequential placeholder identities `{prefix}-01 ..= {prefix}-{count}`.
pub fn synthesize(role: Role, count: usize) -> BTreeSet<String> {
    (1..=count).map(|i| role.synthesized_id(i)).collect()
}
