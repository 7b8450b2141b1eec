use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{schema, EntityId, EntityType, Error, MetadataSearch, Mode, Result, Route};

const SCHEMA_PROPERTY: &str = "schema";
const USER_SCOPE: &str = "USER";
const TAGS: &[&str] = &["metadata", "tags"];

/// Namespaced requests against the metadata service.
///
/// Every request goes through the [`Route`] picked when the client was located;
/// nothing here depends on which route that is.
#[derive(Clone)]
pub struct MetadataClient {
	route: Route,
}

/// An entity whose schema has the searched column, with that column's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
	pub entity_name: String,
	#[serde(rename = "type")]
	pub column_type: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
	Paged { results: Vec<SearchRecord> },
	Bare(Vec<SearchRecord>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRecord {
	entity_id: EntityId,
}

impl MetadataClient {
	pub fn new(route: Route) -> Self {
		Self { route }
	}

	pub fn mode(&self) -> Mode {
		self.route.mode()
	}

	pub fn route(&self) -> &Route {
		&self.route
	}

	async fn get(&self, url: Url) -> Result<reqwest::Response> {
		self.route.execute::<()>(Method::GET, url, None).await
	}

	async fn entity_url(&self, entity: &EntityId, suffix: &[&str]) -> Result<Url> {
		let mut segments = entity.segments().to_vec();
		segments.extend_from_slice(suffix);

		self.route.resolve(&entity.namespace, &segments).await
	}

	/// Entities (datasets and streams only) the search index returns for `query`.
	///
	/// `"*"` matches every entity.
	pub async fn search(&self, namespace: &str, query: &str) -> Result<Vec<EntityId>> {
		let mut url = self.route.resolve(namespace, &["metadata", "search"]).await?;
		{
			let mut pairs = url.query_pairs_mut();
			pairs.append_pair("query", query);
			for entity_type in EntityType::ALL {
				pairs.append_pair("target", entity_type.as_str());
			}
		}

		let records = match self.get(url).await?.json::<SearchResponse>().await? {
			SearchResponse::Paged { results } | SearchResponse::Bare(results) => results,
		};

		let mut seen = BTreeSet::new();
		Ok(records
			.into_iter()
			.map(|record| record.entity_id)
			.filter(|id| seen.insert(id.clone()))
			.collect())
	}

	pub async fn properties(&self, entity: &EntityId) -> Result<HashMap<String, String>> {
		let url = self.entity_url(entity, &["metadata", "properties"]).await?;
		Ok(self.get(url).await?.json().await?)
	}

	/// Every searched entity whose schema has a field named `column`.
	pub async fn column_records(&self, namespace: &str, column: &str) -> Result<Vec<ColumnRecord>> {
		let mut records = Vec::new();

		for entity in self.search(namespace, column).await? {
			let properties = self.properties(&entity).await?;
			let Some(schema) = properties.get(SCHEMA_PROPERTY) else {
				debug!(%entity, "Entity has no schema property, skipping");
				continue;
			};

			match schema::field_type(schema, column)? {
				Some(column_type) => records.push(ColumnRecord {
					entity_name: entity.name,
					column_type,
				}),
				None => debug!(%entity, %column, "Schema has no such column, skipping"),
			}
		}

		Ok(records)
	}
}

#[async_trait]
impl MetadataSearch for MetadataClient {
	async fn tags(&self, namespace: &str) -> Result<BTreeSet<String>> {
		let mut tags = BTreeSet::new();
		for entity in self.search(namespace, "*").await? {
			tags.extend(self.entity_tags(&entity).await?);
		}

		Ok(tags)
	}

	async fn entity_count(&self, namespace: &str, tag: &str) -> Result<usize> {
		Ok(self.search(namespace, tag).await?.len())
	}

	async fn entity_tags(&self, entity: &EntityId) -> Result<BTreeSet<String>> {
		let mut url = self.entity_url(entity, TAGS).await?;
		url.query_pairs_mut().append_pair("scope", USER_SCOPE);

		Ok(self.get(url).await?.json().await?)
	}

	async fn add_tags(&self, entity: &EntityId, tags: &[String]) -> Result<()> {
		let url = self.entity_url(entity, TAGS).await?;
		let tags = tags.iter().collect::<BTreeSet<_>>();

		self.route.execute(Method::POST, url, Some(&tags)).await?;
		Ok(())
	}

	async fn remove_tag(&self, entity: &EntityId, tag: &str) -> Result<bool> {
		let url = self.entity_url(entity, &["metadata", "tags", tag]).await?;

		match self.route.execute::<()>(Method::DELETE, url, None).await {
			Ok(_) => Ok(true),
			Err(Error::NotFound(reason)) => {
				debug!(%entity, %tag, %reason, "Tag was not removed");
				Ok(false)
			}
			Err(e) => Err(e),
		}
	}
}
