//! Liveness results and the vocabulary used to produce them.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;

/// Which path produced a liveness result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tier {
    /// The broker's management HTTP API answered.
    ManagementApi,
    /// The management API was unreachable; queues were probed over AMQP.
    DirectProbe,
    /// Neither path worked. The result is empty.
    Unavailable,
}

impl Tier {
    /// Returns a short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::ManagementApi => "management-api",
            Tier::DirectProbe => "direct-probe",
            Tier::Unavailable => "unavailable",
        }
    }
}

/// The two component roles whose liveness is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    /// An edge device publishing oceanographic readings ("Wavy").
    SensorUnit,
    /// A relay hub consuming from sensor units and forwarding data.
    Aggregator,
}

impl Role {
    /// Prefix used for identities this role is given by estimation.
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::SensorUnit => "Wavy",
            Role::Aggregator => "Aggregator",
        }
    }

    /// Synthesized sequential identity, 1-based and zero-padded: `Wavy-01`.
    pub fn synthesized_id(&self, index: usize) -> String {
        format!("{}-{:02}", self.prefix(), index)
    }
}

/// Maximum plausible number of simultaneously active components per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetCeiling {
    pub sensor_units: usize,
    pub aggregators: usize,
}

impl FleetCeiling {
    /// Default ceiling for each role.
    pub const DEFAULT_PER_ROLE: usize = 4;

    /// The same ceiling for both roles.
    pub const fn uniform(ceiling: usize) -> Self {
        Self {
            sensor_units: ceiling,
            aggregators: ceiling,
        }
    }

    /// Ceiling for one role.
    pub fn for_role(&self, role: Role) -> usize {
        match role {
            Role::SensorUnit => self.sensor_units,
            Role::Aggregator => self.aggregators,
        }
    }
}

impl Default for FleetCeiling {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_PER_ROLE)
    }
}

/// Output of one inference run.
///
/// Identities produced by estimation are placeholders that carry a count,
/// not real device IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LivenessResult {
    pub active_sensor_units: BTreeSet<String>,
    pub active_aggregators: BTreeSet<String>,
    pub tier: Tier,
}

impl LivenessResult {
    /// An empty result for the given tier.
    pub fn empty(tier: Tier) -> Self {
        Self {
            active_sensor_units: BTreeSet::new(),
            active_aggregators: BTreeSet::new(),
            tier,
        }
    }

    /// The result reported when neither path could reach the broker.
    pub fn unavailable() -> Self {
        Self::empty(Tier::Unavailable)
    }

    pub fn sensor_unit_count(&self) -> usize {
        self.active_sensor_units.len()
    }

    pub fn aggregator_count(&self) -> usize {
        self.active_aggregators.len()
    }

    /// Returns true if no component of either role is active.
    pub fn is_empty(&self) -> bool {
        self.active_sensor_units.is_empty() && self.active_aggregators.is_empty()
    }
}
