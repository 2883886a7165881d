use notewise_config::Extraction;
use notewise_domain::{
	category::{InsightType, TagCategory, TagSet},
	extract::{self, CategoryTags},
};

fn tags_of(extracted: &[CategoryTags], category: TagCategory) -> Option<Vec<String>> {
	extracted
		.iter()
		.find(|entry| entry.category == category)
		.map(|entry| entry.tags.as_slice().to_vec())
}

#[test]
fn tags_and_insight_from_session_note() {
	let text = "I felt anxious today. I realized that I avoid conflict with my partner.";
	let extracted = extract::extract(text, &Extraction::default());
	let categories: Vec<_> = extracted.tags.iter().map(|entry| entry.category).collect();

	assert_eq!(categories, vec![TagCategory::Emotions, TagCategory::Themes]);
	assert_eq!(tags_of(&extracted.tags, TagCategory::Emotions), Some(vec!["anxiety".to_string()]));
	assert_eq!(
		tags_of(&extracted.tags, TagCategory::Themes),
		Some(vec!["relationships".to_string()])
	);
	assert_eq!(extracted.insights.len(), 1);
	assert_eq!(extracted.insights[0].insight_type, InsightType::Realization);
	assert_eq!(extracted.insights[0].text, "I avoid conflict with my partner");
	assert_eq!(extracted.insights[0].confidence, 85);
}

#[test]
fn confidence_saturates_for_dense_mentions() {
	let tags: TagSet = vec!["anxiety".to_string()].into();

	assert_eq!(extract::calculate_confidence("anxiety anxiety calm", &tags), 100);
}

#[test]
fn confidence_uses_literal_tag_names() {
	// 1 hit for "work" over 40 words: round(1 / 40 * 1000 + 50) = 75.
	let filler = vec!["today"; 39].join(" ");
	let text = format!("work {filler}");
	let tags: TagSet = vec!["work".to_string()].into();

	assert_eq!(extract::calculate_confidence(&text, &tags), 75);

	// Selected through "boss", but "work" itself never appears.
	let tags: TagSet = vec!["work".to_string()].into();

	assert_eq!(extract::calculate_confidence("my boss yelled", &tags), 50);
}

#[test]
fn confidence_stays_in_range_for_degenerate_input() {
	let tags: TagSet = vec!["calm".to_string()].into();

	assert_eq!(extract::calculate_confidence("", &tags), 50);
	assert_eq!(extract::calculate_confidence("calm", &tags), 100);
	assert_eq!(extract::calculate_confidence("   \n\t ", &TagSet::new()), 50);

	for entry in extract::extract_tags("Calm.", 3) {
		assert!(entry.confidence <= 100);
	}
}

#[test]
fn text_without_keywords_yields_nothing() {
	let extracted =
		extract::extract("The weather was mild and the bus arrived.", &Extraction::default());

	assert!(extracted.tags.is_empty());
	assert!(extracted.insights.is_empty());

	let extracted = extract::extract("", &Extraction::default());

	assert!(extracted.tags.is_empty());
	assert!(extracted.insights.is_empty());
}

#[test]
fn insights_are_capped_in_pattern_order() {
	let text = "\
I'm noticing that I sleep less. \
I realized that I rush. I realized that I skip meals. I realized that I hide. \
I understand that rest matters. I understand that help is fine. \
I've learned that pauses help.";
	let insights = extract::extract_insights(text, 5, 85);
	let kinds: Vec<_> = insights.iter().map(|insight| insight.insight_type).collect();

	assert_eq!(insights.len(), 5);
	assert_eq!(
		kinds,
		vec![
			InsightType::Realization,
			InsightType::Realization,
			InsightType::Realization,
			InsightType::Understanding,
			InsightType::Understanding,
		]
	);
	assert!(insights.iter().all(|insight| insight.confidence == 85));
}

#[test]
fn insight_clause_runs_to_end_of_text_without_terminator() {
	let insights = extract::extract_insights("The pattern I see is that I withdraw when tired", 5, 85);

	assert_eq!(insights.len(), 1);
	assert_eq!(insights[0].insight_type, InsightType::Pattern);
	assert_eq!(insights[0].text, "that I withdraw when tired");
}

#[test]
fn custom_category_collects_medication_and_techniques() {
	let text = "Started sertraline in May. I tried grounding and I'm using breathing apps.";
	let extracted = extract::extract_tags(text, 3);

	assert_eq!(
		tags_of(&extracted, TagCategory::Custom),
		Some(vec![
			"medication:sertraline".to_string(),
			"technique:grounding".to_string(),
			"technique:breathing".to_string(),
		])
	);
	assert_eq!(
		tags_of(&extracted, TagCategory::CopingStrategies),
		Some(vec!["breathing".to_string(), "grounding".to_string()])
	);
}

#[test]
fn tag_sets_serialize_as_plain_arrays() {
	let tags: TagSet = vec!["work".to_string(), "family".to_string()].into();
	let value = serde_json::to_value(&tags).expect("Failed to serialize tag set.");

	assert_eq!(value, serde_json::json!(["work", "family"]));

	let parsed: TagSet =
		serde_json::from_value(serde_json::json!(["a", "b", "a"])).expect("Failed to parse tags.");

	assert_eq!(parsed.len(), 2);
}
