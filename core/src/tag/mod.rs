mod aggregator;
mod result;
mod store;
pub mod validator;

pub use aggregator::{TagAggregator, COUNT_CONCURRENCY};
pub use result::{TagsResult, ValidateTagsResult};
pub use store::TagStore;
pub use validator::{is_valid, validate_tags, MAX_TAG_LENGTH};
