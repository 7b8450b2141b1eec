//! Tag syntax rules.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidateTagsResult;

pub const MAX_TAG_LENGTH: usize = 50;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(&format!("^[A-Za-z0-9_-]{{1,{MAX_TAG_LENGTH}}}$")).expect("tag pattern is valid")
});

/// Whether `tag` is 1 to 50 characters of letters, digits, `_` or `-`.
pub fn is_valid(tag: &str) -> bool {
	TAG_PATTERN.is_match(tag)
}

/// Splits `tags` into valid and invalid ones, keeping input order in each.
pub fn validate_tags<I, S>(tags: I) -> ValidateTagsResult
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut result = ValidateTagsResult::default();

	for tag in tags {
		let tag = tag.as_ref();
		if is_valid(tag) {
			result.valid.push(tag.to_string());
		} else {
			result.invalid.push(tag.to_string());
		}
	}

	result
}
