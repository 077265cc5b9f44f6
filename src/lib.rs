//! # oceanwatch
//!
//! Infers which sensor units ("Wavys") and aggregators of an oceanographic
//! sensor network are currently alive, using only the introspection metadata
//! of the RabbitMQ broker they communicate through.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LivenessEngine                        │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────┐    ┌────────┐│
//! │  │  fetch   │───▶│ Snapshot │───▶│  classify  │───▶│ report ││
//! │  │ (tiers)  │    │          │    │ (stage A/B)│    │ (JSON) ││
//! │  └────┬─────┘    └──────────┘    └────────────┘    └────────┘│
//! │       │                                                      │
//! │       ├── management HTTP API (queues, consumers, ...)       │
//! │       └── passive AMQP probe of rpc_queue_* names            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`fetch`]**: Builds one [`Snapshot`] per run from the management API,
//!   falling back to a passive AMQP sweep
//! - **[`classify`]**: Turns a snapshot into a [`LivenessResult`]
//! - **[`engine`]**: Ties the two together under a caller-supplied deadline
//! - **[`report`]**: The JSON document served to the dashboard
//! - **[`config`]**: Settings from a TOML file and `OCEANWATCH_*` variables
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # One-shot report on stdout
//! oceanwatch --pretty
//!
//! # Refresh every 30 seconds into a file
//! oceanwatch --config oceanwatch.toml --watch --export statistics.json
//! ```
//!
//! ### As a library
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use oceanwatch::{LivenessEngine, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let engine = LivenessEngine::from_settings(&settings)?;
//!
//!     let result = engine.classify_liveness_within(Duration::from_secs(15)).await;
//!     println!("{} Wavys alive", result.active_sensor_units.len());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod duration;
pub mod engine;
pub mod fetch;
pub mod report;

#[cfg(test)]
mod testing;

pub use classify::Classifier;
pub use config::Settings;
pub use engine::{Inference, LivenessEngine};
pub use fetch::{Degraded, Fetched, Fetcher};
pub use report::StatisticsReport;

// Re-export types for convenience
pub use oceanwatch_types::{Coverage, FleetCeiling, LivenessResult, Role, Snapshot, Tier};
