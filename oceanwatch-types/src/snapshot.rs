//! Snapshot - one atomic capture of broker introspection metadata.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    ChannelDescriptor, ConnectionDescriptor, ConsumerDescriptor, QueueDescriptor,
};

/// How much of the broker's metadata a snapshot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Coverage {
    /// Queues, consumers, channels and connections were all fetched.
    #[default]
    Full,
    /// Only the queue listing was fetched; the other three queries failed.
    QueuesOnly,
    /// Queues were discovered by passive probing; nothing else is known.
    Probed,
}

impl Coverage {
    /// Returns true if connection and consumer metadata is present.
    pub fn is_full(&self) -> bool {
        matches!(self, Coverage::Full)
    }
}

/// A point-in-time capture of broker metadata used for one inference run.
///
/// Snapshots are built once by the fetcher and never mutated afterwards.
///
/// # Example
///
/// ```rust
/// use oceanwatch_types::{Coverage, Snapshot};
///
/// let snapshot = Snapshot::builder()
///     .coverage(Coverage::QueuesOnly)
///     .queue("rpc_queue_EU", 1)
///     .build();
///
/// assert_eq!(snapshot.queues[0].name, "rpc_queue_EU");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,

    /// Which metadata this snapshot carries.
    pub coverage: Coverage,

    pub queues: Vec<QueueDescriptor>,
    pub consumers: Vec<ConsumerDescriptor>,
    pub channels: Vec<ChannelDescriptor>,
    pub connections: Vec<ConnectionDescriptor>,
}

impl Snapshot {
    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Create a probed snapshot from the queues a passive sweep found.
    #[cfg(feature = "std")]
    pub fn probed(queues: Vec<QueueDescriptor>) -> Self {
        Self {
            timestamp_ms: current_timestamp_ms(),
            coverage: Coverage::Probed,
            queues,
            consumers: Vec::new(),
            channels: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Number of channels carrying at least one consumer.
    pub fn channels_with_consumers(&self) -> usize {
        self.channels.iter().filter(|c| c.consumer_count > 0).count()
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    coverage: Coverage,
    queues: Vec<QueueDescriptor>,
    consumers: Vec<ConsumerDescriptor>,
    channels: Vec<ChannelDescriptor>,
    connections: Vec<ConnectionDescriptor>,
}

impl SnapshotBuilder {
    /// Create a new builder. Coverage defaults to [`Coverage::Full`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Set the coverage.
    pub fn coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Add a queue with a consumer count.
    pub fn queue(mut self, name: impl Into<String>, consumer_count: u32) -> Self {
        self.queues.push(QueueDescriptor::new(name, consumer_count));
        self
    }

    /// Add a consumer backed by the named connection.
    pub fn consumer(mut self, connection_name: impl Into<String>) -> Self {
        self.consumers
            .push(ConsumerDescriptor::on_connection(connection_name));
        self
    }

    /// Add a consumer whose backing connection is unknown.
    pub fn anonymous_consumer(mut self) -> Self {
        self.consumers.push(ConsumerDescriptor::default());
        self
    }

    /// Add a channel with a consumer count.
    pub fn channel(mut self, consumer_count: u32) -> Self {
        self.channels.push(ChannelDescriptor { consumer_count });
        self
    }

    /// Add a named connection.
    pub fn connection(mut self, name: impl Into<String>) -> Self {
        self.connections.push(ConnectionDescriptor::named(name));
        self
    }

    /// Build the snapshot.
    #[cfg(feature = "std")]
    pub fn build(self) -> Snapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or_else(current_timestamp_ms);
        self.finish(timestamp_ms)
    }

    /// Build the snapshot with a specific timestamp (for no_std).
    #[cfg(not(feature = "std"))]
    pub fn build(self) -> Snapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or(0);
        self.finish(timestamp_ms)
    }

    fn finish(self, timestamp_ms: u64) -> Snapshot {
        Snapshot {
            timestamp_ms,
            coverage: self.coverage,
            queues: self.queues,
            consumers: self.consumers,
            channels: self.channels,
            connections: self.connections,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = Snapshot::builder()
            .timestamp_ms(1703160000000)
            .queue("amq.gen-abc", 1)
            .queue("rpc_queue_EU", 0)
            .consumer("conn-1")
            .anonymous_consumer()
            .channel(1)
            .channel(0)
            .connection("conn-1")
            .build();

        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert_eq!(snapshot.coverage, Coverage::Full);
        assert_eq!(snapshot.queues.len(), 2);
        assert_eq!(snapshot.consumers.len(), 2);
        assert_eq!(snapshot.channels_with_consumers(), 1);
        assert_eq!(snapshot.connections.len(), 1);
    }

    #[test]
    fn test_probed_snapshot_carries_only_queues() {
        let snapshot = Snapshot::probed(vec![
            QueueDescriptor::new("rpc_queue_wavy01", 0).with_messages(3)
        ]);

        assert_eq!(snapshot.coverage, Coverage::Probed);
        assert!(!snapshot.coverage.is_full());
        assert_eq!(snapshot.queues[0].messages, Some(3));
        assert!(snapshot.consumers.is_empty());
        assert!(snapshot.connections.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_coverage_serializes_snake_case() {
        let json = serde_json::to_string(&Coverage::QueuesOnly).unwrap();
        assert_eq!(json, "\"queues_only\"");
    }
}
