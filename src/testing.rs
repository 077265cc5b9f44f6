//! In-memory brokers for exercising the fetcher and engine.

use std::collections::HashMap;

use async_trait::async_trait;

use oceanwatch_adapters::{
    AdapterError, ChannelDescriptor, ConnectionDescriptor, ConsumerDescriptor, ManagementApi,
    ProbeConnector, ProbeSession, QueueDescriptor,
};

/// How a fake management API answers one listing.
#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(Vec<T>),
    Err(AdapterError),
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn get(&self) -> Result<Vec<T>, AdapterError> {
        match self {
            Reply::Ok(items) => Ok(items.clone()),
            Reply::Err(e) => Err(e.clone()),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn push(&mut self, item: T) {
        if let Reply::Ok(items) = self {
            items.push(item);
        }
    }
}

pub struct FakeManagement {
    queues: Reply<QueueDescriptor>,
    consumers: Reply<ConsumerDescriptor>,
    channels: Reply<ChannelDescriptor>,
    connections: Reply<ConnectionDescriptor>,
}

impl FakeManagement {
    pub fn healthy() -> Self {
        Self {
            queues: Reply::Ok(Vec::new()),
            consumers: Reply::Ok(Vec::new()),
            channels: Reply::Ok(Vec::new()),
            connections: Reply::Ok(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        let refused = AdapterError::Connection("connection refused".into());
        Self {
            queues: Reply::Err(refused.clone()),
            consumers: Reply::Err(refused.clone()),
            channels: Reply::Err(refused.clone()),
            connections: Reply::Err(refused),
        }
    }

    pub fn hanging() -> Self {
        Self {
            queues: Reply::Hang,
            consumers: Reply::Hang,
            channels: Reply::Hang,
            connections: Reply::Hang,
        }
    }

    pub fn with_queue(mut self, name: &str, consumers: u32) -> Self {
        self.queues.push(QueueDescriptor::new(name, consumers));
        self
    }

    pub fn with_consumer(mut self, connection: &str) -> Self {
        self.consumers
            .push(ConsumerDescriptor::on_connection(connection));
        self
    }

    pub fn with_channel(mut self, consumers: u32) -> Self {
        self.channels.push(ChannelDescriptor {
            consumer_count: consumers,
        });
        self
    }

    pub fn with_connection(mut self, name: &str) -> Self {
        self.connections.push(ConnectionDescriptor::named(name));
        self
    }

    pub fn failing_connections(mut self, error: AdapterError) -> Self {
        self.connections = Reply::Err(error);
        self
    }

    pub fn hanging_connections(mut self) -> Self {
        self.connections = Reply::Hang;
        self
    }
}

#[async_trait]
impl ManagementApi for FakeManagement {
    async fn queues(&self) -> Result<Vec<QueueDescriptor>, AdapterError> {
        self.queues.get().await
    }

    async fn consumers(&self) -> Result<Vec<ConsumerDescriptor>, AdapterError> {
        self.consumers.get().await
    }

    async fn channels(&self) -> Result<Vec<ChannelDescriptor>, AdapterError> {
        self.channels.get().await
    }

    async fn connections(&self) -> Result<Vec<ConnectionDescriptor>, AdapterError> {
        self.connections.get().await
    }
}

/// A broker reachable only over AMQP, holding a fixed set of queues.
#[derive(Default)]
pub struct FakeBroker {
    queues: HashMap<String, u64>,
    refuse: bool,
}

impl FakeBroker {
    pub fn with_queues(names: &[&str]) -> Self {
        Self {
            queues: names.iter().map(|n| (n.to_string(), 0)).collect(),
            refuse: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }
}

struct FakeSession {
    queues: HashMap<String, u64>,
}

#[async_trait]
impl ProbeConnector for FakeBroker {
    async fn open(&self) -> Result<Box<dyn ProbeSession>, AdapterError> {
        if self.refuse {
            return Err(AdapterError::Connection("connection refused".into()));
        }
        Ok(Box::new(FakeSession {
            queues: self.queues.clone(),
        }))
    }
}

#[async_trait]
impl ProbeSession for FakeSession {
    async fn declare_passive(&mut self, queue: &str) -> Result<Option<u64>, AdapterError> {
        Ok(self.queues.get(queue).copied())
    }

    async fn close(self: Box<Self>) {}
}
