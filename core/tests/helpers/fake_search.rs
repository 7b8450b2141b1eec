#![allow(dead_code)]

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex, PoisonError,
	},
};

use async_trait::async_trait;
use tempfile::TempDir;
use tracker_core::TagStore;
use tracker_metadata::{EntityId, MetadataSearch, Result};

/// In-memory stand-in for the remote metadata index.
#[derive(Default)]
pub struct FakeSearch {
	entities: Mutex<BTreeMap<EntityId, BTreeSet<String>>>,
	added: Mutex<Vec<(EntityId, Vec<String>)>>,
	counting: AtomicUsize,
	most_counting: AtomicUsize,
}

impl FakeSearch {
	pub fn insert(&self, id: EntityId, tags: &[&str]) {
		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.entry(id)
			.or_default()
			.extend(tags.iter().map(|t| t.to_string()));
	}

	/// Every `add_tags` call, in order.
	pub fn added(&self) -> Vec<(EntityId, Vec<String>)> {
		self.added
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Most `entity_count` calls that were running at the same moment.
	pub fn most_concurrent_counts(&self) -> usize {
		self.most_counting.load(Ordering::SeqCst)
	}

	fn in_namespace(&self, namespace: &str) -> Vec<(EntityId, BTreeSet<String>)> {
		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.filter(|(id, _)| id.namespace == namespace)
			.map(|(id, tags)| (id.clone(), tags.clone()))
			.collect()
	}
}

#[async_trait]
impl MetadataSearch for FakeSearch {
	async fn tags(&self, namespace: &str) -> Result<BTreeSet<String>> {
		Ok(self
			.in_namespace(namespace)
			.into_iter()
			.flat_map(|(_, tags)| tags)
			.collect())
	}

	async fn entity_count(&self, namespace: &str, tag: &str) -> Result<usize> {
		let running = self.counting.fetch_add(1, Ordering::SeqCst) + 1;
		self.most_counting.fetch_max(running, Ordering::SeqCst);
		// Stay in flight across a poll so overlapping calls are observable.
		tokio::task::yield_now().await;

		let count = self
			.in_namespace(namespace)
			.iter()
			.filter(|(_, tags)| tags.contains(tag))
			.count();
		self.counting.fetch_sub(1, Ordering::SeqCst);

		Ok(count)
	}

	async fn entity_tags(&self, entity: &EntityId) -> Result<BTreeSet<String>> {
		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(entity)
			.cloned()
			.ok_or_else(|| tracker_metadata::Error::NotFound(entity.to_string()))
	}

	async fn add_tags(&self, entity: &EntityId, tags: &[String]) -> Result<()> {
		self.added
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push((entity.clone(), tags.to_vec()));

		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.entry(entity.clone())
			.or_default()
			.extend(tags.iter().cloned());

		Ok(())
	}

	async fn remove_tag(&self, entity: &EntityId, tag: &str) -> Result<bool> {
		Ok(self
			.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get_mut(entity)
			.map_or(false, |tags| tags.remove(tag)))
	}
}

/// A fresh tag store in a temporary directory. Keep the directory alive for
/// as long as the store is used.
pub fn temp_store(preferred: &[&str]) -> (TempDir, TagStore) {
	let dir = tempfile::tempdir().unwrap();
	let store = TagStore::open(dir.path().join("tags.redb")).unwrap();
	store.add_preferred_tags(preferred).unwrap();
	(dir, store)
}
