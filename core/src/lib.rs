//! Curated ("preferred") and user tags over the catalog's metadata index.
//!
//! Preferred tags live in a local [`TagStore`]. Everything else about tags
//! (which entities carry them, how many) comes from the remote metadata
//! service, reached through a [`tracker_metadata::ServiceLocator`].
//! [`TagAggregator`] combines the two.

pub mod config;
mod context;
mod error;
pub mod logging;
pub mod tag;

pub use config::TrackerConfig;
pub use context::Tracker;
pub use error::{Error, StoreError};
pub use tag::{TagAggregator, TagStore, TagsResult, ValidateTagsResult};

pub type Result<T> = std::result::Result<T, Error>;
