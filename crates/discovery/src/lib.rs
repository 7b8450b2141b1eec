//! Service discovery over a ZooKeeper-compatible coordination service.
//!
//! Services register one ephemeral child node per live instance under
//! `{root}/{service}`; each node holds a small JSON document describing where
//! the instance listens. This crate reads those registrations and picks a live
//! instance for callers that cannot go through the gateway.
//!
//! The coordination service itself is reached through the [`Coordinator`]
//! trait so the discovery logic can run against any backend. [`ZkConnector`]
//! is the production implementation.

use std::time::Duration;

mod coordinator;
mod endpoint;
mod error;
pub mod retry;
mod zookeeper;

pub use coordinator::{Connector, Coordinator, Discoverable, DiscoveryClient};
pub use endpoint::RandomEndpointStrategy;
pub use error::Error;
pub use zookeeper::{ZkConnector, ZkCoordinator};

/// Root node under which services register themselves.
pub const DEFAULT_DISCOVERY_ROOT: &str = "/discoverable";

/// How long a caller waits for a live instance before giving up.
pub const PICK_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a listing of live instances is reused before it is read again.
pub const INSTANCE_TTL: Duration = Duration::from_secs(1);

pub type Result<T> = std::result::Result<T, Error>;
