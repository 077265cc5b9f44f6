//! Per-object broker metadata captured in a snapshot.
//!
//! Every field is already defaulted by the time a descriptor exists: a
//! missing consumer count is zero and a missing connection name is `None`.

use alloc::string::String;

/// A broker queue as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueDescriptor {
    /// Queue name. Empty when the broker omitted it.
    pub name: String,

    /// Number of consumers attached to the queue.
    pub consumer_count: u32,

    /// Messages held by the queue, when the source reported it.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub messages: Option<u64>,
}

impl QueueDescriptor {
    /// Create a queue descriptor with a consumer count.
    pub fn new(name: impl Into<String>, consumer_count: u32) -> Self {
        Self {
            name: name.into(),
            consumer_count,
            messages: None,
        }
    }

    /// Set the message count.
    pub fn with_messages(mut self, messages: u64) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Returns true if at least one consumer is attached.
    pub fn has_consumers(&self) -> bool {
        self.consumer_count > 0
    }
}

/// A consumer, identified only by the connection that backs it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerDescriptor {
    /// Name of the backing connection, if the broker reported one.
    pub connection_name: Option<String>,
}

impl ConsumerDescriptor {
    /// Create a consumer backed by the named connection.
    pub fn on_connection(connection_name: impl Into<String>) -> Self {
        Self {
            connection_name: Some(connection_name.into()),
        }
    }
}

/// A channel and the number of consumers it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelDescriptor {
    pub consumer_count: u32,
}

/// An open client connection. Only counted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionDescriptor {
    pub name: Option<String>,
}

impl ConnectionDescriptor {
    /// Create a named connection.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_has_consumers() {
        assert!(QueueDescriptor::new("rpc_queue_EU", 1).has_consumers());
        assert!(!QueueDescriptor::new("rpc_queue_EU", 0).has_consumers());
    }

    #[test]
    fn test_default_descriptors_are_empty() {
        let queue = QueueDescriptor::default();
        assert!(queue.name.is_empty());
        assert_eq!(queue.consumer_count, 0);
        assert!(queue.messages.is_none());

        assert!(ConsumerDescriptor::default().connection_name.is_none());
        assert!(ConnectionDescriptor::default().name.is_none());
    }
}
