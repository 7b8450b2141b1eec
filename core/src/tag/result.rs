use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tags split into preferred and user tags, each with the number of entities
/// carrying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsResult {
	pub preferred_size: usize,
	pub user_size: usize,
	pub preferred: BTreeMap<String, usize>,
	pub user: BTreeMap<String, usize>,
}

impl TagsResult {
	pub fn new(preferred: BTreeMap<String, usize>, user: BTreeMap<String, usize>) -> Self {
		Self {
			preferred_size: preferred.len(),
			user_size: user.len(),
			preferred,
			user,
		}
	}

	pub fn preferred_only(preferred: BTreeMap<String, usize>) -> Self {
		Self::new(preferred, BTreeMap::new())
	}

	pub fn user_only(user: BTreeMap<String, usize>) -> Self {
		Self::new(BTreeMap::new(), user)
	}
}

/// Partition of a tag list. Order within each side follows the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateTagsResult {
	pub valid: Vec<String>,
	pub invalid: Vec<String>,
}
