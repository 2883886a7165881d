//! Static extraction tables. Iteration order is declaration order, which keeps tag and insight
//! output deterministic.

use crate::category::{InsightType, TagCategory};

pub struct TagPattern {
	pub category: TagCategory,
	pub tag: &'static str,
	pub pattern: &'static str,
}

pub struct InsightPattern {
	pub insight_type: InsightType,
	pub pattern: &'static str,
}

pub const TAG_PATTERNS: &[TagPattern] = &[
	TagPattern {
		category: TagCategory::Emotions,
		tag: "anxiety",
		pattern: r"(?i)\b(anxious|anxiety|worried|worry|nervous|panic|panicked)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "depression",
		pattern: r"(?i)\b(depressed|depression|hopeless|numb)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "sadness",
		pattern: r"(?i)\b(sad|sadness|crying|cried|tearful|unhappy)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "anger",
		pattern: r"(?i)\b(angry|anger|furious|frustrated|frustration|irritated|resentful)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "fear",
		pattern: r"(?i)\b(afraid|scared|fear|fearful|terrified)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "shame",
		pattern: r"(?i)\b(ashamed|shame|guilt|guilty|embarrassed)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "happiness",
		pattern: r"(?i)\b(happy|happiness|joy|joyful|excited)\b",
	},
	TagPattern {
		category: TagCategory::Emotions,
		tag: "calm",
		pattern: r"(?i)\b(calm|calmer|peaceful|relaxed|at ease)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "relationships",
		pattern: r"(?i)\b(relationships?|partner|spouse|husband|wife|boyfriend|girlfriend|marriage|dating)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "family",
		pattern: r"(?i)\b(family|mother|father|mom|dad|parents?|siblings?|brother|sister|children|kids)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "work",
		pattern: r"(?i)\b(work|job|career|boss|coworkers?|workplace|office)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "self_esteem",
		pattern: r"(?i)\b(self[- ]esteem|self[- ]worth|worthless|not good enough|insecure)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "trauma",
		pattern: r"(?i)\b(trauma|traumatic|abuse|abused|flashbacks?|ptsd)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "grief",
		pattern: r"(?i)\b(grief|grieving|loss|passed away|bereavement|mourning)\b",
	},
	TagPattern {
		category: TagCategory::Themes,
		tag: "health",
		pattern: r"(?i)\b(health|sleep|insomnia|illness|pain|appetite)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "mindfulness",
		pattern: r"(?i)\b(mindfulness|mindful|meditation|meditate|meditating)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "breathing",
		pattern: r"(?i)\b(breathing|deep breaths?|box breathing)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "journaling",
		pattern: r"(?i)\b(journal|journaling|journaled|diary)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "exercise",
		pattern: r"(?i)\b(exercise|exercising|walking|running|yoga|workout)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "grounding",
		pattern: r"(?i)\b(grounding|5-4-3-2-1)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "reframing",
		pattern: r"(?i)\b(reframe|reframed|reframing|challenged? (my|the|those) thoughts?)\b",
	},
	TagPattern {
		category: TagCategory::CopingStrategies,
		tag: "social_support",
		pattern: r"(?i)\b(talked to|reached out|support group|called (a|my) friend)\b",
	},
	TagPattern {
		category: TagCategory::ProgressIndicators,
		tag: "improvement",
		pattern: r"(?i)\b(improved|improving|improvement|progress|better)\b",
	},
	TagPattern {
		category: TagCategory::ProgressIndicators,
		tag: "breakthrough",
		pattern: r"(?i)\b(breakthrough|major shift|finally understood)\b",
	},
	TagPattern {
		category: TagCategory::ProgressIndicators,
		tag: "goal_achieved",
		pattern: r"(?i)\b(achieved|accomplished|reached (my|a|the) goal|met (my|the) goal)\b",
	},
	TagPattern {
		category: TagCategory::ProgressIndicators,
		tag: "setback",
		pattern: r"(?i)\b(setback|relapse|relapsed|worse|regressed)\b",
	},
];

/// Captures the word following a medication cue, tagged as `medication:<word>`.
pub const MEDICATION_PATTERN: &str =
	r"(?i)\b(?:taking|prescribed|medication|started)\s+([a-z0-9][a-z0-9-]*)";

/// Captures the word following a technique cue, tagged as `technique:<word>`.
pub const TECHNIQUE_PATTERN: &str =
	r"(?i)\b(?:tried|using|practicing|learned)\s+([a-z0-9][a-z0-9-]*)";

pub const INSIGHT_PATTERNS: &[InsightPattern] = &[
	InsightPattern {
		insight_type: InsightType::Realization,
		pattern: r"(?i)\bI realized that\s+([^.!?]+)",
	},
	InsightPattern {
		insight_type: InsightType::Understanding,
		pattern: r"(?i)\bI understand that\s+([^.!?]+)",
	},
	InsightPattern {
		insight_type: InsightType::Learning,
		pattern: r"(?i)\bI(?:['’]ve| have) learned that\s+([^.!?]+)",
	},
	InsightPattern {
		insight_type: InsightType::Pattern,
		pattern: r"(?i)\bThe pattern I see is\s+([^.!?]+)",
	},
	InsightPattern {
		insight_type: InsightType::Observation,
		pattern: r"(?i)\bI(?:['’]m| am) noticing that\s+([^.!?]+)",
	},
];

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use regex::Regex;

	use super::*;

	#[test]
	fn every_pattern_compiles() {
		for entry in TAG_PATTERNS {
			assert!(Regex::new(entry.pattern).is_ok(), "Bad pattern for {}.", entry.tag);
		}
		for entry in INSIGHT_PATTERNS {
			assert!(Regex::new(entry.pattern).is_ok(), "Bad pattern for {}.", entry.insight_type);
		}

		assert!(Regex::new(MEDICATION_PATTERN).is_ok());
		assert!(Regex::new(TECHNIQUE_PATTERN).is_ok());
	}

	#[test]
	fn tag_names_are_unique_per_category() {
		let mut seen = HashSet::new();

		for entry in TAG_PATTERNS {
			assert!(seen.insert((entry.category, entry.tag)), "Duplicate tag {}.", entry.tag);
			assert_ne!(entry.category, TagCategory::Custom);
		}
	}

	#[test]
	fn categories_are_declared_in_extraction_order() {
		let order: Vec<_> = TAG_PATTERNS.iter().map(|entry| entry.category).collect();
		let mut sorted = order.clone();

		sorted.sort();

		assert_eq!(order, sorted);
	}
}
