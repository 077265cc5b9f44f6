//! # oceanwatch-adapters
//!
//! Transports for reading broker introspection metadata.
//!
//! Two tiers are provided, each behind a trait so the liveness engine can be
//! driven by in-memory fakes in tests:
//!
//! - [`ManagementApi`]: the four read-only listings (queues, consumers,
//!   channels, connections) of the RabbitMQ Management HTTP API
//!   (`rabbitmq` feature, [`rabbitmq::RabbitMqManagement`])
//! - [`ProbeConnector`] / [`ProbeSession`]: a direct AMQP connection that
//!   passively declares candidate queues without ever creating them
//!   (`amqp` feature, [`amqp::AmqpProber`]). The bounded sweep over candidate
//!   names lives in [`probe`].
//!
//! ## Quick Start (RabbitMQ)
//!
//! ```rust,no_run
//! use oceanwatch_adapters::rabbitmq::RabbitMqManagement;
//! use oceanwatch_adapters::ManagementApi;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = RabbitMqManagement::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let queues = api.queues().await?;
//!     println!("Broker has {} queues", queues.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

pub mod error;
pub mod probe;

#[cfg(feature = "rabbitmq")]
pub mod rabbitmq;

#[cfg(feature = "amqp")]
pub mod amqp;

pub use error::AdapterError;

// Re-export types for convenience
pub use oceanwatch_types::{
    ChannelDescriptor, ConnectionDescriptor, ConsumerDescriptor, QueueDescriptor, Snapshot,
};

/// Read-only listings exposed by a broker's management interface.
///
/// Each call is independent; implementations bound every call with their own
/// request timeout.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn queues(&self) -> Result<Vec<QueueDescriptor>, AdapterError>;

    async fn consumers(&self) -> Result<Vec<ConsumerDescriptor>, AdapterError>;

    async fn channels(&self) -> Result<Vec<ChannelDescriptor>, AdapterError>;

    async fn connections(&self) -> Result<Vec<ConnectionDescriptor>, AdapterError>;
}

/// Opens sessions able to passively check queue existence.
#[async_trait]
pub trait ProbeConnector: Send + Sync {
    /// Open a connection and a channel to the broker.
    async fn open(&self) -> Result<Box<dyn ProbeSession>, AdapterError>;
}

/// One open broker connection used for passive queue checks.
#[async_trait]
pub trait ProbeSession: Send {
    /// Passively declare `queue`.
    ///
    /// Returns `Ok(Some(message_count))` if the queue exists and `Ok(None)` if
    /// the broker reports it does not. Must never create the queue.
    async fn declare_passive(&mut self, queue: &str) -> Result<Option<u64>, AdapterError>;

    /// Close the underlying connection.
    async fn close(self: Box<Self>);
}
