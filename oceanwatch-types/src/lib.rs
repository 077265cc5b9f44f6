//! # oceanwatch-types
//!
//! Core types for broker liveness inference. This crate defines the shape of
//! a broker metadata [`Snapshot`] and the [`LivenessResult`] derived from it,
//! independent of how the metadata was fetched.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to serialize snapshots and results
//! - **Transport agnostic**: Snapshots look the same whether they came from the
//!   management API or from passive AMQP probing
//! - **Versioned output**: Reports built from these types carry [`SCHEMA_VERSION`]
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use oceanwatch_types::{Coverage, Snapshot};
//!
//! let snapshot = Snapshot::builder()
//!     .queue("AF-Agr01_ocean_queue", 2)
//!     .queue("amq.gen-Xk2P9qLmZ0a1", 1)
//!     .consumer("10.0.0.7:51514 -> 10.0.0.2:5672")
//!     .channel(1)
//!     .connection("10.0.0.7:51514 -> 10.0.0.2:5672")
//!     .connection("10.0.0.9:40022 -> 10.0.0.2:5672")
//!     .build();
//!
//! assert_eq!(snapshot.coverage, Coverage::Full);
//! assert_eq!(snapshot.queues.len(), 2);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod descriptor;
mod liveness;
mod snapshot;

pub use descriptor::*;
pub use liveness::*;
pub use snapshot::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot or report format.
pub const SCHEMA_VERSION: u32 = 1;
