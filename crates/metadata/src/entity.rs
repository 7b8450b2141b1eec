use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
	Dataset,
	Stream,
}

impl EntityType {
	pub const ALL: [EntityType; 2] = [EntityType::Dataset, EntityType::Stream];

	/// Value of the `target` search parameter.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Dataset => "dataset",
			Self::Stream => "stream",
		}
	}

	/// Collection segment in entity URLs.
	pub fn collection(&self) -> &'static str {
		match self {
			Self::Dataset => "datasets",
			Self::Stream => "streams",
		}
	}
}

impl fmt::Display for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EntityType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"dataset" => Ok(Self::Dataset),
			"stream" => Ok(Self::Stream),
			_ => Err(Error::UnknownEntityType(s.to_string())),
		}
	}
}

/// A dataset or stream inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "WireEntityId", into = "WireEntityId")]
pub struct EntityId {
	pub namespace: String,
	pub entity_type: EntityType,
	pub name: String,
}

impl EntityId {
	pub fn new(namespace: impl Into<String>, entity_type: EntityType, name: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			entity_type,
			name: name.into(),
		}
	}

	pub fn dataset(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self::new(namespace, EntityType::Dataset, name)
	}

	pub fn stream(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self::new(namespace, EntityType::Stream, name)
	}

	/// Path segments of this entity relative to its namespace, e.g.
	/// `["datasets", "purchases"]`. The name is one segment whatever it contains.
	pub fn segments(&self) -> [&str; 2] {
		[self.entity_type.collection(), &self.name]
	}
}

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}.{}", self.entity_type, self.namespace, self.name)
	}
}

/// Entity ids as the metadata service writes them.
#[derive(Serialize, Deserialize)]
#[serde(tag = "entity")]
enum WireEntityId {
	#[serde(rename = "DATASET")]
	Dataset { namespace: String, dataset: String },
	#[serde(rename = "STREAM")]
	Stream { namespace: String, stream: String },
}

impl From<WireEntityId> for EntityId {
	fn from(wire: WireEntityId) -> Self {
		match wire {
			WireEntityId::Dataset { namespace, dataset } => Self::dataset(namespace, dataset),
			WireEntityId::Stream { namespace, stream } => Self::stream(namespace, stream),
		}
	}
}

impl From<EntityId> for WireEntityId {
	fn from(id: EntityId) -> Self {
		match id.entity_type {
			EntityType::Dataset => Self::Dataset {
				namespace: id.namespace,
				dataset: id.name,
			},
			EntityType::Stream => Self::Stream {
				namespace: id.namespace,
				stream: id.name,
			},
		}
	}
}
