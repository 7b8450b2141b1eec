use std::collections::{BTreeMap, BTreeSet};

use futures::{stream, StreamExt, TryStreamExt};
use tracing::debug;
use tracker_metadata::{EntityId, EntityType, MetadataSearch};

use super::{validator::validate_tags, TagStore, TagsResult, ValidateTagsResult};
use crate::Result;

/// Entity-count searches in flight at once for a single call.
pub const COUNT_CONCURRENCY: usize = 4;

/// Answers tag questions by combining the local [`TagStore`] with remote search.
///
/// A tag is preferred iff the store has it, otherwise it is a user tag. The
/// split is recomputed on every call and entity counts always come from a live
/// search, never from the stored counter.
pub struct TagAggregator<'a> {
	store: &'a TagStore,
	search: &'a dyn MetadataSearch,
}

impl<'a> TagAggregator<'a> {
	pub fn new(store: &'a TagStore, search: &'a dyn MetadataSearch) -> Self {
		Self { store, search }
	}

	/// Remote tags in `namespace` that are not preferred.
	pub async fn user_tags(&self, prefix: &str, namespace: &str) -> Result<TagsResult> {
		let preferred = self.store.tags()?;
		let user = self.user_counts(prefix, namespace, &preferred).await?;

		Ok(TagsResult::user_only(user))
	}

	/// Preferred tags, counted against `namespace`.
	pub async fn preferred_tags(&self, prefix: &str, namespace: &str) -> Result<TagsResult> {
		let preferred = self.store.tags()?;
		let counts = self
			.count(namespace, filter_prefix(preferred.into_iter(), prefix))
			.await?;

		Ok(TagsResult::preferred_only(counts))
	}

	/// Both sides, classified against a single read of the store.
	pub async fn tags(&self, prefix: &str, namespace: &str) -> Result<TagsResult> {
		let preferred = self.store.tags()?;
		let user = self.user_counts(prefix, namespace, &preferred).await?;
		let preferred = self
			.count(namespace, filter_prefix(preferred.into_iter(), prefix))
			.await?;

		Ok(TagsResult::new(preferred, user))
	}

	/// Tags attached to one entity, split into preferred and user tags.
	pub async fn entity_tags(
		&self,
		namespace: &str,
		entity_type: EntityType,
		entity_name: &str,
	) -> Result<TagsResult> {
		let entity = EntityId::new(namespace, entity_type, entity_name);
		let remote = self.search.entity_tags(&entity).await?;
		let preferred = self.store.tags()?;

		let (preferred_tags, user_tags): (Vec<_>, Vec<_>) =
			remote.into_iter().partition(|tag| preferred.contains(tag));
		debug!(%entity, ?preferred_tags, ?user_tags, "Classified entity tags");

		Ok(TagsResult::new(
			self.count(namespace, preferred_tags).await?,
			self.count(namespace, user_tags).await?,
		))
	}

	/// Attaches the valid tags among `tags` to an entity. Invalid tags are
	/// reported and never sent.
	pub async fn add_entity_tags<I, S>(
		&self,
		namespace: &str,
		entity_type: EntityType,
		entity_name: &str,
		tags: I,
	) -> Result<ValidateTagsResult>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let result = validate_tags(tags);
		if result.valid.is_empty() {
			debug!(invalid = ?result.invalid, "No valid tags to add");
			return Ok(result);
		}

		let entity = EntityId::new(namespace, entity_type, entity_name);
		self.search.add_tags(&entity, &result.valid).await?;

		Ok(result)
	}

	/// `Ok(false)` if the entity or tag was not found remotely.
	pub async fn remove_entity_tag(
		&self,
		namespace: &str,
		entity_type: EntityType,
		entity_name: &str,
		tag: &str,
	) -> Result<bool> {
		let entity = EntityId::new(namespace, entity_type, entity_name);
		Ok(self.search.remove_tag(&entity, tag).await?)
	}

	async fn user_counts(
		&self,
		prefix: &str,
		namespace: &str,
		preferred: &BTreeSet<String>,
	) -> Result<BTreeMap<String, usize>> {
		let remote = self.search.tags(namespace).await?;
		let user = remote.into_iter().filter(|tag| !preferred.contains(tag));

		self.count(namespace, filter_prefix(user, prefix)).await
	}

	/// Live entity count of every tag, at most [`COUNT_CONCURRENCY`] searches
	/// at a time.
	async fn count(
		&self,
		namespace: &str,
		tags: Vec<String>,
	) -> Result<BTreeMap<String, usize>> {
		let counts = stream::iter(tags)
			.map(move |tag| async move {
				let count = self.search.entity_count(namespace, &tag).await?;
				Ok::<_, tracker_metadata::Error>((tag, count))
			})
			.buffered(COUNT_CONCURRENCY)
			.try_collect()
			.await?;

		Ok(counts)
	}
}

/// Tags whose lowercase form starts with the lowercase `prefix`.
fn filter_prefix(tags: impl Iterator<Item = String>, prefix: &str) -> Vec<String> {
	let prefix = prefix.to_lowercase();
	tags.filter(|tag| tag.to_lowercase().starts_with(&prefix))
		.collect()
}
