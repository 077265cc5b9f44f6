//! RabbitMQ adapter using the Management HTTP API.
//!
//! This adapter reads broker metadata from the Management API, which is
//! typically available on port 15672.
//!
//! ## Listings Read
//!
//! - **Queues** (`/api/queues`): name, consumer count and message count
//! - **Consumers** (`/api/consumers`): the connection backing each consumer
//! - **Channels** (`/api/channels`): consumer count per channel
//! - **Connections** (`/api/connections`): counted only
//!
//! Broker metadata is an external contract, so records are parsed leniently:
//! a missing, `null` or wrongly typed field becomes zero or absent instead of
//! failing the whole listing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oceanwatch_adapters::rabbitmq::RabbitMqManagement;
//! use oceanwatch_adapters::ManagementApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = RabbitMqManagement::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .vhost("/")
//!         .build()?;
//!
//!     for queue in api.queues().await? {
//!         println!("{}: {} consumers", queue.name, queue.consumer_count);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use oceanwatch_types::{
    ChannelDescriptor, ConnectionDescriptor, ConsumerDescriptor, QueueDescriptor,
};

use crate::{AdapterError, ManagementApi};

/// Default per-request timeout for management queries.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// RabbitMQ Management API client.
#[derive(Debug, Clone)]
pub struct RabbitMqManagement {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
    vhost: Option<String>,
}

impl RabbitMqManagement {
    /// Create a new builder for configuring the client.
    pub fn builder() -> RabbitMqManagementBuilder {
        RabbitMqManagementBuilder::default()
    }

    fn listing_url(&self, listing: &str) -> String {
        match &self.vhost {
            Some(vhost) => format!("{}/api/{}/{}", self.endpoint, listing, urlencoded(vhost)),
            None => format!("{}/api/{}", self.endpoint, listing),
        }
    }

    async fn fetch_listing(&self, listing: &str) -> Result<Vec<Value>, AdapterError> {
        let url = self.listing_url(listing);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdapterError::Auth("Invalid credentials".to_string()));
        }

        if !response.status().is_success() {
            return Err(AdapterError::Http(format!(
                "API returned status {} for {}",
                response.status(),
                listing
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let records = records(body);
        debug!(listing, count = records.len(), "Fetched management listing");
        Ok(records)
    }
}

#[async_trait]
impl ManagementApi for RabbitMqManagement {
    async fn queues(&self) -> Result<Vec<QueueDescriptor>, AdapterError> {
        Ok(parse_queues(self.fetch_listing("queues").await?))
    }

    async fn consumers(&self) -> Result<Vec<ConsumerDescriptor>, AdapterError> {
        Ok(parse_consumers(self.fetch_listing("consumers").await?))
    }

    async fn channels(&self) -> Result<Vec<ChannelDescriptor>, AdapterError> {
        Ok(parse_channels(self.fetch_listing("channels").await?))
    }

    async fn connections(&self) -> Result<Vec<ConnectionDescriptor>, AdapterError> {
        Ok(parse_connections(self.fetch_listing("connections").await?))
    }
}

/// Builder for RabbitMqManagement.
#[derive(Debug, Default)]
pub struct RabbitMqManagementBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    vhost: Option<String>,
    timeout: Option<Duration>,
}

impl RabbitMqManagementBuilder {
    /// Set the Management API endpoint (e.g., "http://localhost:15672").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Restrict listings to one vhost (default: all vhosts).
    pub fn vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
        self
    }

    /// Set the per-request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RabbitMqManagement, AdapterError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Http(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:15672".to_string());

        Ok(RabbitMqManagement {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            username: self.username.unwrap_or_else(|| "guest".to_string()),
            password: self.password.unwrap_or_else(|| "guest".to_string()),
            vhost: self.vhost,
        })
    }
}

// URL encode a string for use in paths
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F")
}

// A listing that is valid JSON but not an array carries no records.
fn records(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        other => {
            debug!(kind = json_kind(&other), "Management listing is not an array");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Records that are not objects decode to the default.
fn decode<T: for<'de> Deserialize<'de> + Default>(record: Value) -> T {
    serde_json::from_value(record).unwrap_or_default()
}

pub(crate) fn parse_queues(records: Vec<Value>) -> Vec<QueueDescriptor> {
    records
        .into_iter()
        .map(|r| {
            let info: QueueInfo = decode(r);
            QueueDescriptor {
                name: info.name.unwrap_or_default(),
                consumer_count: saturate(info.consumers),
                messages: info.messages,
            }
        })
        .collect()
}

pub(crate) fn parse_consumers(records: Vec<Value>) -> Vec<ConsumerDescriptor> {
    records
        .into_iter()
        .map(|r| {
            let info: ConsumerInfo = decode(r);
            let connection_name = info
                .channel_details
                .map(decode::<ChannelDetails>)
                .and_then(|d| d.connection_name);
            ConsumerDescriptor { connection_name }
        })
        .collect()
}

pub(crate) fn parse_channels(records: Vec<Value>) -> Vec<ChannelDescriptor> {
    records
        .into_iter()
        .map(|r| {
            let info: ChannelInfo = decode(r);
            ChannelDescriptor {
                consumer_count: saturate(info.consumer_count),
            }
        })
        .collect()
}

pub(crate) fn parse_connections(records: Vec<Value>) -> Vec<ConnectionDescriptor> {
    records
        .into_iter()
        .map(|r| {
            let info: ConnectionInfo = decode(r);
            ConnectionDescriptor { name: info.name }
        })
        .collect()
}

fn saturate(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Queue record from the Management API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueueInfo {
    #[serde(deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    consumers: u64,
    #[serde(deserialize_with = "lenient_opt_count")]
    messages: Option<u64>,
}

/// Consumer record. Only the owning channel's connection is read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConsumerInfo {
    channel_details: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChannelDetails {
    #[serde(deserialize_with = "lenient_string")]
    connection_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChannelInfo {
    #[serde(deserialize_with = "lenient_count")]
    consumer_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConnectionInfo {
    #[serde(deserialize_with = "lenient_string")]
    name: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(count_of(&Value::deserialize(d)?).unwrap_or(0))
}

fn lenient_opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(count_of(&Value::deserialize(d)?))
}

fn count_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    }
}
