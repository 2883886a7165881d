use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
	Emotions,
	Themes,
	CopingStrategies,
	ProgressIndicators,
	Custom,
}
impl TagCategory {
	/// Declaration order; extraction emits categories in this order.
	pub const ALL: [Self; 5] =
		[Self::Emotions, Self::Themes, Self::CopingStrategies, Self::ProgressIndicators, Self::Custom];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Emotions => "emotions",
			Self::Themes => "themes",
			Self::CopingStrategies => "coping_strategies",
			Self::ProgressIndicators => "progress_indicators",
			Self::Custom => "custom",
		}
	}
}
impl fmt::Display for TagCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for TagCategory {
	type Err = UnknownLabel;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|category| category.as_str() == value)
			.ok_or_else(|| UnknownLabel { kind: "tag category", value: value.to_string() })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
	Realization,
	Understanding,
	Learning,
	Pattern,
	Observation,
	Breakthrough,
}
impl InsightType {
	pub const ALL: [Self; 6] = [
		Self::Realization,
		Self::Understanding,
		Self::Learning,
		Self::Pattern,
		Self::Observation,
		Self::Breakthrough,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Realization => "realization",
			Self::Understanding => "understanding",
			Self::Learning => "learning",
			Self::Pattern => "pattern",
			Self::Observation => "observation",
			Self::Breakthrough => "breakthrough",
		}
	}

	/// Insight kinds surfaced as breakthroughs in a journey synthesis.
	pub fn is_breakthrough(self) -> bool {
		matches!(self, Self::Breakthrough | Self::Realization)
	}
}
impl fmt::Display for InsightType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for InsightType {
	type Err = UnknownLabel;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == value)
			.ok_or_else(|| UnknownLabel { kind: "insight type", value: value.to_string() })
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
	pub kind: &'static str,
	pub value: String,
}
impl fmt::Display for UnknownLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Unknown {}: {:?}.", self.kind, self.value)
	}
}
impl std::error::Error for UnknownLabel {}

/// Tag names in insertion order, each appearing at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);
impl TagSet {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Returns `false` when the name was already present.
	pub fn insert(&mut self, name: impl Into<String>) -> bool {
		let name = name.into();

		if self.contains(&name) {
			return false;
		}

		self.0.push(name);

		true
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.iter().any(|existing| existing == name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl From<Vec<String>> for TagSet {
	fn from(values: Vec<String>) -> Self {
		values.into_iter().collect()
	}
}
impl From<TagSet> for Vec<String> {
	fn from(set: TagSet) -> Self {
		set.0
	}
}
impl FromIterator<String> for TagSet {
	fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
		let mut set = Self::new();

		for name in iter {
			set.insert(name);
		}

		set
	}
}
impl<'a> IntoIterator for &'a TagSet {
	type Item = &'a String;
	type IntoIter = std::slice::Iter<'a, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tag_set_keeps_first_occurrence_order() {
		let set: TagSet =
			vec!["work".to_string(), "family".to_string(), "work".to_string()].into();

		assert_eq!(set.as_slice(), ["work".to_string(), "family".to_string()]);
	}

	#[test]
	fn parses_storage_labels() {
		assert_eq!("coping_strategies".parse::<TagCategory>(), Ok(TagCategory::CopingStrategies));
		assert_eq!("breakthrough".parse::<InsightType>(), Ok(InsightType::Breakthrough));
		assert!("hobbies".parse::<TagCategory>().is_err());
	}
}
