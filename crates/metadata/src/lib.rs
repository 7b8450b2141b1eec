//! Client for the catalog's metadata service.
//!
//! Callers obtain a [`MetadataClient`] from a [`ServiceLocator`], which decides
//! once per client whether requests go through the authenticated gateway or
//! straight to a metadata service instance found through service discovery.
//! After that choice the client is used the same way in both modes.

use std::collections::BTreeSet;

use async_trait::async_trait;

mod client;
pub mod config;
mod entity;
mod error;
mod locator;
mod route;
pub mod schema;

pub use client::{ColumnRecord, MetadataClient};
pub use config::{AccessToken, ClientConfig, ConnectionConfig};
pub use entity::{EntityId, EntityType};
pub use error::{AuthenticationRequired, Error};
pub use locator::{LocatorSettings, ServiceLocator, DEFAULT_METADATA_SERVICE};
pub use route::{probe_gateway, DiscoveryRoute, GatewayProbe, GatewayRoute, Mode, Route};

pub type Result<T> = std::result::Result<T, Error>;

/// The remote operations tag aggregation is built on.
///
/// Every search is restricted to datasets and streams.
#[async_trait]
pub trait MetadataSearch: Send + Sync {
	/// Every distinct user-scope tag found on any entity in `namespace`.
	async fn tags(&self, namespace: &str) -> Result<BTreeSet<String>>;

	/// How many entities in `namespace` the search index returns for `tag`.
	async fn entity_count(&self, namespace: &str, tag: &str) -> Result<usize>;

	/// User-scope tags attached to one entity.
	async fn entity_tags(&self, entity: &EntityId) -> Result<BTreeSet<String>>;

	async fn add_tags(&self, entity: &EntityId, tags: &[String]) -> Result<()>;

	/// Returns `false` if the remote reported the entity or tag as not found.
	async fn remove_tag(&self, entity: &EntityId, tag: &str) -> Result<bool>;
}
