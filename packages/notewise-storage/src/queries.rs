use notewise_domain::category::TagSet;

use crate::{Error, Result, store::ClientScope};

/// Escape character used in every `LIKE`/`ILIKE ... ESCAPE` clause.
pub const LIKE_ESCAPE: char = '\\';

/// Escapes `LIKE` metacharacters so the query only ever matches itself.
pub fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
			out.push(LIKE_ESCAPE);
		}

		out.push(ch);
	}

	out
}

/// `%<escaped>%` for a contains-style `ILIKE`.
pub fn contains_pattern(raw: &str) -> String {
	format!("%{}%", escape_like(raw))
}

/// Serialized form of a tag list, the text that tag searches run against.
pub fn serialize_tags(tags: &TagSet) -> String {
	serde_json::to_string(tags.as_slice()).unwrap_or_default()
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn validate_scope(scope: ClientScope<'_>) -> Result<()> {
	if scope.client_id.trim().is_empty() || scope.therapist_id.trim().is_empty() {
		return Err(Error::InvalidArgument(
			"client_id and therapist_id must be non-empty.".to_string(),
		));
	}

	Ok(())
}

pub fn validate_confidence(confidence: u8) -> Result<()> {
	if confidence > 100 {
		return Err(Error::InvalidArgument(format!(
			"confidence must be in the range 0-100, got {confidence}."
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escapes_like_metacharacters() {
		assert_eq!(escape_like("100%"), "100\\%");
		assert_eq!(escape_like("self_esteem"), "self\\_esteem");
		assert_eq!(escape_like("a\\b"), "a\\\\b");
		assert_eq!(escape_like("plain words"), "plain words");
	}

	#[test]
	fn wraps_contains_pattern() {
		assert_eq!(contains_pattern("_%"), "%\\_\\%%");
	}

	#[test]
	fn serialized_tags_are_json_arrays() {
		let tags: TagSet = vec!["work".to_string(), "grief".to_string()].into();

		assert_eq!(serialize_tags(&tags), r#"["work","grief"]"#);
	}

	#[test]
	fn rejects_out_of_range_confidence() {
		assert!(validate_confidence(100).is_ok());
		assert!(validate_confidence(101).is_err());
	}
}
