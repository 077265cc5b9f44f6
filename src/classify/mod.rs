//! Liveness classification of broker metadata snapshots.
//!
//! ## Stages
//!
//! ```text
//! Snapshot
//!    │
//!    ├── coverage = Probed ──────▶ probe identities (rpc_queue_wavy01 → wavy01)
//!    │
//!    ▼
//! Stage A: ordered name rules ([`rules::RULES`], first match wins)
//!    │
//!    ├── coverage = QueuesOnly, or nothing matched ──▶ Stage A identities
//!    │
//!    ▼
//! Stage B: counts from connections/consumers ([`estimate::Estimate`])
//!    │
//!    ▼
//! Wavy-01.. / Aggregator-01.. placeholders
//! ```
//!
//! Every path caps each identity set at the role's fleet ceiling.

pub mod estimate;
pub mod rules;

use std::collections::BTreeSet;

use tracing::debug;

use oceanwatch_types::{Coverage, FleetCeiling, LivenessResult, Role, Snapshot, Tier};

pub use estimate::{synthesize, Estimate};
pub use rules::{classify_queue, match_rule, probe_identity, Candidate, Rule, StageA, RULES};

/// Turns snapshots into liveness results. Pure; holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    ceiling: FleetCeiling,
}

impl Classifier {
    pub fn new(ceiling: FleetCeiling) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> &FleetCeiling {
        &self.ceiling
    }

    /// Classify a snapshot. Never fails.
    pub fn classify(&self, snapshot: &Snapshot) -> LivenessResult {
        match snapshot.coverage {
            Coverage::Probed => self.classify_probed(snapshot),
            Coverage::Full | Coverage::QueuesOnly => self.classify_listed(snapshot),
        }
    }

    fn classify_listed(&self, snapshot: &Snapshot) -> LivenessResult {
        let stage_a = StageA::from_queues(&snapshot.queues);
        debug!(
            queues = snapshot.queues.len(),
            sensor_candidates = stage_a.sensor_units.len(),
            aggregator_candidates = stage_a.aggregators.len(),
            "Stage A classification"
        );

        if !snapshot.coverage.is_full() || stage_a.is_empty() {
            return self.capped(
                stage_a.sensor_units,
                stage_a.aggregators,
                Tier::ManagementApi,
            );
        }

        let estimate =
            Estimate::from_snapshot(snapshot, stage_a.anonymous_consumer_queues(), &self.ceiling);
        debug!(
            anonymous_queues = stage_a.anonymous_consumer_queues(),
            consumer_connections = estimate.consumer_connections,
            publish_only_connections = estimate.publish_only_connections,
            channels_with_consumers = estimate.channels_with_consumers,
            channels_without_consumers = estimate.channels_without_consumers,
            sensor_units = estimate.sensor_units,
            aggregators = estimate.aggregators,
            "Stage B estimate"
        );

        LivenessResult {
            active_sensor_units: synthesize(Role::SensorUnit, estimate.sensor_units),
            active_aggregators: synthesize(Role::Aggregator, estimate.aggregators),
            tier: Tier::ManagementApi,
        }
    }

    fn classify_probed(&self, snapshot: &Snapshot) -> LivenessResult {
        let mut sensor_units = BTreeSet::new();
        let mut aggregators = BTreeSet::new();

        for (role, identity) in snapshot.queues.iter().filter_map(|q| probe_identity(&q.name)) {
            match role {
                Role::SensorUnit => sensor_units.insert(identity),
                Role::Aggregator => aggregators.insert(identity),
            };
        }

        self.capped(sensor_units, aggregators, Tier::DirectProbe)
    }

    fn capped(
        &self,
        sensor_units: BTreeSet<String>,
        aggregators: BTreeSet<String>,
        tier: Tier,
    ) -> LivenessResult {
        LivenessResult {
            active_sensor_units: cap(sensor_units, self.ceiling.sensor_units),
            active_aggregators: cap(aggregators, self.ceiling.aggregators),
            tier,
        }
    }
}

// Keeps the lexicographically first `ceiling` identities.
fn cap(identities: BTreeSet<String>, ceiling: usize) -> BTreeSet<String> {
    if identities.len() <= ceiling {
        return identities;
    }
    identities.into_iter().take(ceiling).collect()
}
