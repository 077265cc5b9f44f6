//! Stage A: name-pattern classification of broker queues.
//!
//! Rules are evaluated in [`RULES`] order and the first rule whose name
//! pattern matches decides the queue. The order is a contract: a queue named
//! `rpc_queue_AF-Agr01_ocean_queue` is a relay queue, not an RPC queue. The
//! consumer gate is applied after the rule is chosen, so an idle queue is
//! dropped rather than offered to later rules.

use std::collections::BTreeSet;

use oceanwatch_types::{QueueDescriptor, Role};

/// Suffix of the queue an aggregator consumes sensor readings from.
pub const RELAY_QUEUE_SUFFIX: &str = "_ocean_queue";
/// Token identifying an aggregator in relay queue names (`AF-Agr01`).
pub const AGGREGATOR_TOKEN: &str = "Agr";
/// Prefix of per-region RPC queues served by an aggregation server.
pub const RPC_QUEUE_PREFIX: &str = "rpc_queue_";
/// Prefix of broker-named (exclusive, auto-delete) queues.
pub const ANONYMOUS_QUEUE_PREFIX: &str = "amq.gen-";
/// Suffix of per-region server queues.
pub const SERVER_QUEUE_SUFFIX: &str = "_server_queue";

/// Trailing characters of an anonymous queue name used as a uniqueness key.
const ANONYMOUS_KEY_LEN: usize = 8;

/// One name-pattern rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `{REGION}-Agr{NN}_ocean_queue` → aggregator `{REGION}-Agr{NN}`.
    RelayQueue,
    /// `rpc_queue_{REGION}` → aggregator `{REGION}-Server`.
    RpcQueue,
    /// `amq.gen-…` → sensor unit `Wavy-{last 8 chars}`.
    AnonymousQueue,
    /// `{region}_server_queue` → aggregator `{REGION}-ServerQueue`.
    ServerQueue,
}

/// Rules in evaluation order. Earlier rules shadow later ones.
pub const RULES: [Rule; 4] = [
    Rule::RelayQueue,
    Rule::RpcQueue,
    Rule::AnonymousQueue,
    Rule::ServerQueue,
];

impl Rule {
    /// Returns true if the queue name has this rule's shape.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Rule::RelayQueue => {
                name.contains(RELAY_QUEUE_SUFFIX) && name.contains(AGGREGATOR_TOKEN)
            }
            Rule::RpcQueue => name.starts_with(RPC_QUEUE_PREFIX),
            Rule::AnonymousQueue => name.starts_with(ANONYMOUS_QUEUE_PREFIX),
            Rule::ServerQueue => name.ends_with(SERVER_QUEUE_SUFFIX),
        }
    }

    /// Role a matching queue is evidence for.
    pub fn role(&self) -> Role {
        match self {
            Rule::AnonymousQueue => Role::SensorUnit,
            _ => Role::Aggregator,
        }
    }

    /// Identity derived from a queue name this rule matched.
    pub fn identity(&self, name: &str) -> String {
        match self {
            Rule::RelayQueue => name.replace(RELAY_QUEUE_SUFFIX, ""),
            Rule::RpcQueue => format!("{}-Server", name.replace(RPC_QUEUE_PREFIX, "")),
            Rule::AnonymousQueue => format!("{}-{}", Role::SensorUnit.prefix(), tail(name)),
            Rule::ServerQueue => format!(
                "{}-ServerQueue",
                name.replace(SERVER_QUEUE_SUFFIX, "").to_uppercase()
            ),
        }
    }
}

// Last ANONYMOUS_KEY_LEN characters, or the whole name if shorter.
fn tail(name: &str) -> &str {
    let count = name.chars().count();
    if count <= ANONYMOUS_KEY_LEN {
        return name;
    }
    let start = name
        .char_indices()
        .nth(count - ANONYMOUS_KEY_LEN)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &name[start..]
}

/// First rule whose name pattern matches, if any.
pub fn match_rule(name: &str) -> Option<Rule> {
    RULES.iter().copied().find(|rule| rule.matches(name))
}

/// A queue that survived Stage A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub rule: Rule,
    pub identity: String,
}

impl Candidate {
    pub fn role(&self) -> Role {
        self.rule.role()
    }
}

/// Classify one queue: the first matching rule decides, then the queue must
/// have at least one consumer.
pub fn classify_queue(queue: &QueueDescriptor) -> Option<Candidate> {
    let rule = match_rule(&queue.name)?;
    if !queue.has_consumers() {
        return None;
    }
    Some(Candidate {
        rule,
        identity: rule.identity(&queue.name),
    })
}

/// Identity sets produced by Stage A.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageA {
    pub sensor_units: BTreeSet<String>,
    pub aggregators: BTreeSet<String>,
}

impl StageA {
    /// Run every queue through the rules.
    pub fn from_queues(queues: &[QueueDescriptor]) -> Self {
        let mut stage = Self::default();
        for candidate in queues.iter().filter_map(classify_queue) {
            stage.insert(candidate.role(), candidate.identity);
        }
        stage
    }

    fn insert(&mut self, role: Role, identity: String) {
        match role {
            Role::SensorUnit => self.sensor_units.insert(identity),
            Role::Aggregator => self.aggregators.insert(identity),
        };
    }

    /// Distinct anonymous consumer queues seen (one per sensor identity).
    pub fn anonymous_consumer_queues(&self) -> usize {
        self.sensor_units.len()
    }

    /// Returns true if no queue matched.
    pub fn is_empty(&self) -> bool {
        self.sensor_units.is_empty() && self.aggregators.is_empty()
    }
}

/// Identity for a queue found by passive probing: `rpc_queue_wavy01` is
/// sensor unit `wavy01`, `rpc_queue_Aggregator03` is aggregator
/// `Aggregator03`. Names mentioning neither role are ignored.
pub fn probe_identity(name: &str) -> Option<(Role, String)> {
    let identity = name.strip_prefix(RPC_QUEUE_PREFIX)?;
    let lowered = identity.to_lowercase();
    if lowered.contains("wavy") {
        Some((Role::SensorUnit, identity.to_string()))
    } else if lowered.contains("aggregator") {
        Some((Role::Aggregator, identity.to_string()))
    } else {
        None
    }
}
