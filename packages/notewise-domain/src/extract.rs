//! Tag and insight extraction over a single note. Every function here is total: malformed or
//! empty text yields empty output rather than an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
	category::{InsightType, TagCategory, TagSet},
	patterns::{INSIGHT_PATTERNS, MEDICATION_PATTERN, TAG_PATTERNS, TECHNIQUE_PATTERN},
};

const MEDICATION_PREFIX: &str = "medication:";
const TECHNIQUE_PREFIX: &str = "technique:";

// A pattern that fails to compile never matches; `patterns::tests` keeps the tables valid.
static TAG_MATCHERS: LazyLock<Vec<Option<Regex>>> =
	LazyLock::new(|| TAG_PATTERNS.iter().map(|entry| Regex::new(entry.pattern).ok()).collect());
static INSIGHT_MATCHERS: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
	INSIGHT_PATTERNS.iter().map(|entry| Regex::new(entry.pattern).ok()).collect()
});
static MEDICATION_MATCHER: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(MEDICATION_PATTERN).ok());
static TECHNIQUE_MATCHER: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(TECHNIQUE_PATTERN).ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTags {
	pub category: TagCategory,
	pub tags: TagSet,
	pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightCandidate {
	pub text: String,
	pub insight_type: InsightType,
	pub confidence: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteExtraction {
	pub tags: Vec<CategoryTags>,
	pub insights: Vec<InsightCandidate>,
}

pub fn extract(text: &str, cfg: &notewise_config::Extraction) -> NoteExtraction {
	NoteExtraction {
		tags: extract_tags(text, cfg.max_technique_tags as usize),
		insights: extract_insights(
			text,
			cfg.max_insights as usize,
			cfg.insight_confidence.min(100),
		),
	}
}

/// Selects tags by pattern presence, then scores each non-empty category by how often its
/// selected tag names occur verbatim.
pub fn extract_tags(text: &str, max_technique_tags: usize) -> Vec<CategoryTags> {
	let mut out = Vec::new();

	for category in TagCategory::ALL {
		let tags = if category == TagCategory::Custom {
			custom_tags(text, max_technique_tags)
		} else {
			matched_tags(text, category)
		};

		if tags.is_empty() {
			continue;
		}

		let confidence = calculate_confidence(text, &tags);

		out.push(CategoryTags { category, tags, confidence });
	}

	out
}

pub fn extract_insights(text: &str, max_insights: usize, confidence: u8) -> Vec<InsightCandidate> {
	let mut out = Vec::new();

	if max_insights == 0 {
		return out;
	}

	for (entry, matcher) in INSIGHT_PATTERNS.iter().zip(INSIGHT_MATCHERS.iter()) {
		let Some(matcher) = matcher else { continue };

		for captures in matcher.captures_iter(text) {
			let Some(clause) = captures.get(1) else { continue };
			let clause = clause.as_str().trim();

			if clause.is_empty() {
				continue;
			}

			out.push(InsightCandidate {
				text: clause.to_string(),
				insight_type: entry.insight_type,
				confidence,
			});

			if out.len() >= max_insights {
				return out;
			}
		}
	}

	out
}

/// `min(round(matches / words * 1000 + 50), 100)` where `matches` counts whole-word,
/// case-insensitive occurrences of each tag name and `words` is never below one.
pub fn calculate_confidence(text: &str, tags: &TagSet) -> u8 {
	let words = word_count(text).max(1) as f64;
	let matches: usize = tags.iter().map(|tag| count_occurrences(text, tag)).sum();
	let score = (matches as f64 / words * 1_000.0 + 50.0).round();

	score.clamp(0.0, 100.0) as u8
}

pub fn word_count(text: &str) -> usize {
	text.split_whitespace().count()
}

fn matched_tags(text: &str, category: TagCategory) -> TagSet {
	let mut tags = TagSet::new();

	for (entry, matcher) in TAG_PATTERNS.iter().zip(TAG_MATCHERS.iter()) {
		if entry.category != category {
			continue;
		}
		if matcher.as_ref().map(|re| re.is_match(text)).unwrap_or(false) {
			tags.insert(entry.tag);
		}
	}

	tags
}

fn custom_tags(text: &str, max_technique_tags: usize) -> TagSet {
	let mut tags = TagSet::new();

	if let Some(matcher) = MEDICATION_MATCHER.as_ref() {
		for captures in matcher.captures_iter(text) {
			if let Some(value) = captures.get(1) {
				tags.insert(format!("{MEDICATION_PREFIX}{}", value.as_str().to_lowercase()));
			}
		}
	}
	if let Some(matcher) = TECHNIQUE_MATCHER.as_ref() {
		for captures in matcher.captures_iter(text).take(max_technique_tags) {
			if let Some(value) = captures.get(1) {
				tags.insert(format!("{TECHNIQUE_PREFIX}{}", value.as_str().to_lowercase()));
			}
		}
	}

	tags
}

fn count_occurrences(text: &str, tag: &str) -> usize {
	let pattern = format!(r"(?i)\b{}\b", regex::escape(tag));

	Regex::new(&pattern).map(|re| re.find_iter(text).count()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_whole_word_occurrences_only() {
		assert_eq!(count_occurrences("Work, work and workplace.", "work"), 2);
		assert_eq!(count_occurrences("nothing here", "work"), 0);
	}

	#[test]
	fn technique_cues_are_capped() {
		let text = "I tried yoga, tried running, tried journaling and tried painting.";
		let tags = custom_tags(text, 3);

		assert_eq!(
			tags.as_slice(),
			[
				"technique:yoga".to_string(),
				"technique:running".to_string(),
				"technique:journaling".to_string(),
			]
		);
	}

	#[test]
	fn medication_values_are_lower_cased() {
		let tags = custom_tags("She was prescribed Sertraline last month.", 3);

		assert_eq!(tags.as_slice(), ["medication:sertraline".to_string()]);
	}
}
