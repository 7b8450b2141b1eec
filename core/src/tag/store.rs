use std::{collections::BTreeSet, path::Path};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info};

use super::{validator::validate_tags, ValidateTagsResult};
use crate::StoreError;

/// Preferred tag to usage counter. A row exists iff the tag is preferred.
const PREFERRED_TAGS: TableDefinition<'_, &str, u64> = TableDefinition::new("preferred_tags");

type Result<T> = std::result::Result<T, StoreError>;

/// Local store of preferred tags.
///
/// Every mutation commits one write transaction per tag, so bulk operations
/// are not atomic as a whole; their returned partition says what happened.
pub struct TagStore {
	db: Database,
}

impl TagStore {
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let db = Database::create(path)?;

		let txn = db.begin_write()?;
		{
			txn.open_table(PREFERRED_TAGS)?;
		}
		txn.commit()?;

		info!(path = %path.display(), "Opened tag store");

		Ok(Self { db })
	}

	pub fn contains(&self, tag: &str) -> Result<bool> {
		let txn = self.db.begin_read()?;
		let table = txn.open_table(PREFERRED_TAGS)?;
		let present = table.get(tag)?.is_some();

		Ok(present)
	}

	/// Every preferred tag, read in a single transaction.
	pub fn tags(&self) -> Result<BTreeSet<String>> {
		let txn = self.db.begin_read()?;
		let table = txn.open_table(PREFERRED_TAGS)?;

		let mut tags = BTreeSet::new();
		for entry in table.iter()? {
			let (tag, _) = entry?;
			tags.insert(tag.value().to_string());
		}

		Ok(tags)
	}

	/// `(tag, usage_count)` rows. The counter is written as 0 and never updated.
	pub fn preferred_tag_entries(&self) -> Result<Vec<(String, u64)>> {
		let txn = self.db.begin_read()?;
		let table = txn.open_table(PREFERRED_TAGS)?;

		let entries = table
			.iter()?
			.map(|entry| {
				let (tag, count) = entry?;
				Ok((tag.value().to_string(), count.value()))
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(entries)
	}

	pub fn usage_count(&self, tag: &str) -> Result<Option<u64>> {
		let txn = self.db.begin_read()?;
		let table = txn.open_table(PREFERRED_TAGS)?;
		let count = table.get(tag)?.map(|count| count.value());

		Ok(count)
	}

	/// Stores the valid tags as preferred; invalid ones are reported, not stored.
	///
	/// Re-adding a preferred tag resets its counter to 0.
	pub fn add_preferred_tags<I, S>(&self, tags: I) -> Result<ValidateTagsResult>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let result = validate_tags(tags);

		for tag in &result.valid {
			let txn = self.db.begin_write()?;
			{
				let mut table = txn.open_table(PREFERRED_TAGS)?;
				table.insert(tag.as_str(), 0u64)?;
			}
			txn.commit()?;
		}

		debug!(added = ?result.valid, rejected = ?result.invalid, "Added preferred tags");

		Ok(result)
	}

	/// Turns preferred tags back into plain user tags.
	///
	/// Tags that were preferred come back as valid, the rest as invalid. Tag
	/// syntax is not checked.
	pub fn demote_tags<I, S>(&self, tags: I) -> Result<ValidateTagsResult>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut result = ValidateTagsResult::default();

		for tag in tags {
			let tag = tag.as_ref();
			if self.delete_tag(tag)? {
				result.valid.push(tag.to_string());
			} else {
				result.invalid.push(tag.to_string());
			}
		}

		Ok(result)
	}

	/// `Ok(false)` if `tag` was not preferred.
	pub fn delete_tag(&self, tag: &str) -> Result<bool> {
		let txn = self.db.begin_write()?;
		let removed = {
			let mut table = txn.open_table(PREFERRED_TAGS)?;
			let removed = table.remove(tag)?.is_some();
			removed
		};
		txn.commit()?;

		debug!(%tag, removed, "Deleted preferred tag");

		Ok(removed)
	}
}
