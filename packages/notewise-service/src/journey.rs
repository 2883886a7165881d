//! Longitudinal synthesis over a client's stored notes, tag records and insights.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use notewise_config::Journey;
use notewise_domain::{
	category::{TagCategory, TagSet},
	sentiment,
};
use notewise_storage::{
	DateRange,
	models::{InsightRecord, JourneySnapshot, Note, TagRecord},
};

use crate::{Error, NotewiseService, Result, time_serde::Timestamp};

const ANXIETY_TAG: &str = "anxiety";
const BREAKTHROUGH_TAG: &str = "breakthrough";
const RELATIONSHIPS_TAG: &str = "relationships";

const ANXIETY_RECOMMENDATION: &str =
	"Continue practicing anxiety management techniques such as breathing and grounding.";
const BREAKTHROUGH_RECOMMENDATION: &str =
	"Consolidate recent breakthroughs with reflection and integration exercises.";
const RELATIONSHIPS_RECOMMENDATION: &str =
	"Explore communication strategies for relationship challenges.";

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesizeRequest {
	pub client_id: String,
	pub therapist_id: String,
	#[serde(default)]
	pub start_date: Option<Timestamp>,
	#[serde(default)]
	pub end_date: Option<Timestamp>,
	#[serde(default)]
	pub focus_tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JourneyHistoryRequest {
	pub client_id: String,
	pub therapist_id: String,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneySynthesis {
	pub synthesis_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	#[serde(with = "crate::time_serde")]
	pub synthesized_at: OffsetDateTime,
	pub time_range: TimeRange,
	pub focus_tags: Vec<String>,
	pub dominant_themes: DominantThemes,
	pub emotional_trajectory: Vec<EmotionPoint>,
	pub progress_indicators: ProgressIndicators,
	pub key_insights: Vec<String>,
	pub coping_strategies: CopingStrategies,
	pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
	#[serde(with = "crate::time_serde")]
	pub start: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub end: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantThemes {
	pub frequency: BTreeMap<String, u32>,
	/// Session dates of every occurrence, oldest first.
	pub timeline: BTreeMap<String, Vec<Timestamp>>,
	pub trending: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionPoint {
	#[serde(with = "crate::time_serde")]
	pub date: OffsetDateTime,
	pub emotions: Vec<String>,
	pub sentiment: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressIndicators {
	pub counts: BTreeMap<String, u32>,
	pub breakthroughs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopingStrategies {
	pub usage: BTreeMap<String, u32>,
	pub effectiveness: BTreeMap<String, u8>,
	pub recommended: Vec<String>,
}

impl NotewiseService {
	pub async fn synthesize(&self, req: SynthesizeRequest) -> Result<JourneySynthesis> {
		self.synthesize_at(req, OffsetDateTime::now_utc()).await
	}

	/// Synthesizes as of `now`, which anchors the default window end and the trending window.
	pub async fn synthesize_at(
		&self,
		req: SynthesizeRequest,
		now: OffsetDateTime,
	) -> Result<JourneySynthesis> {
		let scope = crate::client_scope(&req.client_id, &req.therapist_id)?;
		let start = req.start_date.map(|date| date.0).unwrap_or(OffsetDateTime::UNIX_EPOCH);
		let end = req.end_date.map(|date| date.0).unwrap_or(now);

		if start > end {
			return Err(Error::InvalidRequest {
				message: "start_date must not be after end_date.".to_string(),
			});
		}

		let range = DateRange { start, end };
		let (notes, tag_records, insights) = tokio::try_join!(
			self.store.list_notes(scope, range),
			self.store.list_tag_records(scope, range),
			self.store.list_insights(scope, range),
		)?;
		let cfg = &self.cfg.journey;
		let focus = FocusFilter::new(&req.focus_tags);
		let dominant_themes = dominant_themes(&tag_records, &focus, now, cfg);
		let emotional_trajectory = emotional_trajectory(&notes, &tag_records, &focus);
		let progress_indicators = progress_indicators(&tag_records, &insights, &focus, cfg);
		let coping_strategies = coping_strategies(&tag_records, &focus, cfg);
		let recommendations =
			recommendations(&dominant_themes, &emotional_trajectory, &progress_indicators);
		let synthesis = JourneySynthesis {
			synthesis_id: Uuid::new_v4(),
			client_id: req.client_id.clone(),
			therapist_id: req.therapist_id.clone(),
			synthesized_at: now,
			time_range: TimeRange { start, end },
			focus_tags: req.focus_tags.clone(),
			dominant_themes,
			emotional_trajectory,
			progress_indicators,
			key_insights: key_insights(&insights, cfg.max_key_insights as usize),
			coping_strategies,
			recommendations,
		};
		let payload = serde_json::to_value(&synthesis).map_err(|err| Error::Storage {
			message: format!("Failed to encode journey synthesis: {err}"),
		})?;

		self.store
			.insert_journey(&JourneySnapshot {
				synthesis_id: synthesis.synthesis_id,
				client_id: synthesis.client_id.clone(),
				therapist_id: synthesis.therapist_id.clone(),
				synthesized_at: now,
				range_start: start,
				range_end: end,
				payload,
			})
			.await?;

		tracing::info!(
			client_id = %req.client_id,
			synthesis_id = %synthesis.synthesis_id,
			notes = notes.len(),
			tag_records = tag_records.len(),
			insights = insights.len(),
			"Journey synthesized."
		);

		Ok(synthesis)
	}

	/// Previously persisted syntheses, newest first.
	pub async fn journey_history(
		&self,
		req: JourneyHistoryRequest,
	) -> Result<Vec<JourneySynthesis>> {
		let scope = crate::client_scope(&req.client_id, &req.therapist_id)?;
		let limit = req.limit.unwrap_or(self.cfg.journey.history_limit);

		if limit == 0 {
			return Err(Error::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			});
		}

		let snapshots = self.store.list_journeys(scope, limit).await?;

		snapshots
			.into_iter()
			.map(|snapshot| {
				serde_json::from_value(snapshot.payload).map_err(|err| Error::Storage {
					message: format!(
						"Invalid journey payload for {}: {err}",
						snapshot.synthesis_id
					),
				})
			})
			.collect()
	}
}

/// Case-insensitive tag allow-list. Empty means every tag passes.
#[derive(Debug, Default)]
struct FocusFilter(HashSet<String>);
impl FocusFilter {
	fn new(tags: &[String]) -> Self {
		Self(
			tags.iter()
				.map(|tag| tag.trim().to_lowercase())
				.filter(|tag| !tag.is_empty())
				.collect(),
		)
	}

	fn allows(&self, tag: &str) -> bool {
		self.0.is_empty() || self.0.contains(&tag.to_lowercase())
	}
}

fn tags_in<'a>(
	records: &'a [TagRecord],
	category: TagCategory,
	focus: &'a FocusFilter,
) -> impl Iterator<Item = (&'a TagRecord, &'a str)> + 'a {
	records.iter().filter(move |record| record.category == category).flat_map(move |record| {
		record.tags.iter().filter(move |tag| focus.allows(tag)).map(move |tag| (record, tag))
	})
}

fn dominant_themes(
	records: &[TagRecord],
	focus: &FocusFilter,
	now: OffsetDateTime,
	cfg: &Journey,
) -> DominantThemes {
	let cutoff = now
		.checked_sub(Duration::days(i64::from(cfg.trending_window_days)))
		.unwrap_or(OffsetDateTime::UNIX_EPOCH);
	let mut themes = DominantThemes::default();
	let mut recent: BTreeMap<&str, u32> = BTreeMap::new();

	for (record, tag) in tags_in(records, TagCategory::Themes, focus) {
		*themes.frequency.entry(tag.to_string()).or_default() += 1;

		themes.timeline.entry(tag.to_string()).or_default().push(record.session_date.into());

		if (cutoff..=now).contains(&record.session_date) {
			*recent.entry(tag).or_default() += 1;
		}
	}

	let mut ranked: Vec<(&str, u32)> = recent.into_iter().collect();

	// Stable sort over name-ordered entries, so equal counts stay alphabetical.
	ranked.sort_by(|a, b| b.1.cmp(&a.1));

	themes.trending = ranked
		.into_iter()
		.take(cfg.max_trending_themes as usize)
		.map(|(name, _)| name.to_string())
		.collect();

	themes
}

fn emotional_trajectory(
	notes: &[Note],
	records: &[TagRecord],
	focus: &FocusFilter,
) -> Vec<EmotionPoint> {
	notes
		.iter()
		.map(|note| {
			let mut emotions = TagSet::new();

			for (_, tag) in tags_in(records, TagCategory::Emotions, focus)
				.filter(|(record, _)| record.session_id == note.session_id)
			{
				emotions.insert(tag);
			}

			EmotionPoint {
				date: note.session_date,
				emotions: emotions.into(),
				sentiment: sentiment::sentiment_score(note.content.as_deref().unwrap_or_default()),
			}
		})
		.collect()
}

fn progress_indicators(
	records: &[TagRecord],
	insights: &[InsightRecord],
	focus: &FocusFilter,
	cfg: &Journey,
) -> ProgressIndicators {
	let mut progress = ProgressIndicators::default();

	for (_, tag) in tags_in(records, TagCategory::ProgressIndicators, focus) {
		*progress.counts.entry(tag.to_string()).or_default() += 1;
	}

	progress.breakthroughs = insights
		.iter()
		.filter(|insight| insight.insight_type.is_breakthrough())
		.take(cfg.max_breakthroughs as usize)
		.map(|insight| insight.text.clone())
		.collect();

	progress
}

fn key_insights(insights: &[InsightRecord], limit: usize) -> Vec<String> {
	let mut ranked: Vec<&InsightRecord> = insights.iter().collect();

	ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));

	ranked.into_iter().take(limit).map(|insight| insight.text.clone()).collect()
}

/// `records` must be ordered oldest first; the latest assignment of a strategy sets its
/// effectiveness.
fn coping_strategies(
	records: &[TagRecord],
	focus: &FocusFilter,
	cfg: &Journey,
) -> CopingStrategies {
	let mut coping = CopingStrategies::default();

	for (record, tag) in tags_in(records, TagCategory::CopingStrategies, focus) {
		*coping.usage.entry(tag.to_string()).or_default() += 1;

		coping.effectiveness.insert(tag.to_string(), record.confidence);
	}

	coping.recommended = coping
		.usage
		.iter()
		.filter(|(name, uses)| {
			**uses < cfg.underused_strategy_max_uses
				&& coping
					.effectiveness
					.get(name.as_str())
					.is_some_and(|confidence| *confidence > cfg.effective_strategy_threshold)
		})
		.map(|(name, _)| name.clone())
		.collect();

	coping
}

fn recommendations(
	themes: &DominantThemes,
	trajectory: &[EmotionPoint],
	progress: &ProgressIndicators,
) -> Vec<String> {
	let anxious = themes.frequency.contains_key(ANXIETY_TAG)
		|| trajectory
			.iter()
			.any(|point| point.emotions.iter().any(|emotion| emotion == ANXIETY_TAG));
	let mut out = Vec::new();

	if anxious {
		out.push(ANXIETY_RECOMMENDATION.to_string());
	}
	if progress.counts.contains_key(BREAKTHROUGH_TAG) {
		out.push(BREAKTHROUGH_RECOMMENDATION.to_string());
	}
	if themes.frequency.contains_key(RELATIONSHIPS_TAG) {
		out.push(RELATIONSHIPS_RECOMMENDATION.to_string());
	}

	out
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use notewise_domain::category::InsightType;

	use super::*;

	const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

	fn journey_cfg() -> Journey {
		Journey::default()
	}

	fn record(
		session_id: Uuid,
		category: TagCategory,
		tags: &[&str],
		session_date: OffsetDateTime,
		confidence: u8,
	) -> TagRecord {
		TagRecord {
			tag_id: Uuid::new_v4(),
			session_id,
			client_id: "c".to_string(),
			therapist_id: "t".to_string(),
			category,
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			confidence,
			session_date,
			created_at: session_date,
		}
	}

	fn insight(text: &str, insight_type: InsightType, confidence: u8) -> InsightRecord {
		InsightRecord {
			insight_id: Uuid::new_v4(),
			session_id: Uuid::new_v4(),
			client_id: "c".to_string(),
			therapist_id: "t".to_string(),
			text: text.to_string(),
			insight_type,
			confidence,
			created_at: NOW,
		}
	}

	#[test]
	fn trending_ignores_themes_outside_the_window() {
		let three_weeks_ago = NOW - Duration::weeks(3);
		let last_week = NOW - Duration::weeks(1);
		let records = vec![
			record(Uuid::new_v4(), TagCategory::Themes, &["work"], three_weeks_ago, 60),
			record(Uuid::new_v4(), TagCategory::Themes, &["work"], three_weeks_ago, 60),
			record(Uuid::new_v4(), TagCategory::Themes, &["family"], last_week, 60),
		];
		let themes = dominant_themes(&records, &FocusFilter::default(), NOW, &journey_cfg());

		assert_eq!(themes.frequency.get("work"), Some(&2));
		assert_eq!(themes.trending, vec!["family".to_string()]);
		assert_eq!(themes.timeline.get("work").map(Vec::len), Some(2));
	}

	#[test]
	fn trending_ranks_by_recent_count_then_name() {
		let recent = NOW - Duration::days(1);
		let records = vec![
			record(Uuid::new_v4(), TagCategory::Themes, &["work", "grief"], recent, 60),
			record(Uuid::new_v4(), TagCategory::Themes, &["grief"], recent, 60),
			record(Uuid::new_v4(), TagCategory::Themes, &["family"], recent, 60),
		];
		let themes = dominant_themes(&records, &FocusFilter::default(), NOW, &journey_cfg());

		assert_eq!(themes.trending, vec!["grief", "family", "work"]);
	}

	#[test]
	fn trending_skips_sessions_after_the_synthesis_moment() {
		let records = vec![
			record(Uuid::new_v4(), TagCategory::Themes, &["work"], NOW + Duration::days(3), 60),
			record(Uuid::new_v4(), TagCategory::Themes, &["family"], NOW, 60),
		];
		let themes = dominant_themes(&records, &FocusFilter::default(), NOW, &journey_cfg());

		assert_eq!(themes.frequency.get("work"), Some(&1));
		assert_eq!(themes.trending, vec!["family".to_string()]);
	}

	#[test]
	fn oversized_trending_window_saturates() {
		let cfg = Journey { trending_window_days: u32::MAX, ..journey_cfg() };
		let records = vec![record(
			Uuid::new_v4(),
			TagCategory::Themes,
			&["grief"],
			datetime!(1990-06-01 0:00 UTC),
			60,
		)];
		let themes = dominant_themes(&records, &FocusFilter::default(), NOW, &cfg);

		assert_eq!(themes.trending, vec!["grief".to_string()]);
	}

	#[test]
	fn latest_assignment_sets_effectiveness() {
		let records = vec![
			record(Uuid::new_v4(), TagCategory::CopingStrategies, &["breathing"], NOW, 40),
			record(
				Uuid::new_v4(),
				TagCategory::CopingStrategies,
				&["breathing", "journaling"],
				NOW + Duration::days(1),
				90,
			),
			record(Uuid::new_v4(), TagCategory::CopingStrategies, &["journaling"], NOW, 95),
		];
		let mut sorted = records.clone();

		sorted.sort_by(|a, b| a.session_date.cmp(&b.session_date));

		let coping = coping_strategies(&sorted, &FocusFilter::default(), &journey_cfg());

		assert_eq!(coping.usage.get("breathing"), Some(&2));
		assert_eq!(coping.effectiveness.get("breathing"), Some(&90));
		assert_eq!(coping.effectiveness.get("journaling"), Some(&90));
		assert_eq!(coping.recommended, vec!["breathing".to_string(), "journaling".to_string()]);
	}

	#[test]
	fn heavily_used_strategies_are_not_recommended() {
		let records: Vec<TagRecord> = (0..3)
			.map(|_| record(Uuid::new_v4(), TagCategory::CopingStrategies, &["exercise"], NOW, 80))
			.collect();
		let coping = coping_strategies(&records, &FocusFilter::default(), &journey_cfg());

		assert!(coping.recommended.is_empty());
	}

	#[test]
	fn key_insights_keep_input_order_for_ties() {
		let insights = vec![
			insight("first", InsightType::Learning, 85),
			insight("second", InsightType::Learning, 85),
			insight("top", InsightType::Pattern, 95),
		];

		assert_eq!(key_insights(&insights, 10), vec!["top", "first", "second"]);
		assert_eq!(key_insights(&insights, 1), vec!["top"]);
	}

	#[test]
	fn breakthroughs_include_realizations() {
		let insights = vec![
			insight("a", InsightType::Observation, 85),
			insight("b", InsightType::Realization, 85),
			insight("c", InsightType::Breakthrough, 85),
		];
		let progress =
			progress_indicators(&[], &insights, &FocusFilter::default(), &journey_cfg());

		assert_eq!(progress.breakthroughs, vec!["b", "c"]);
	}

	#[test]
	fn recommendations_follow_fixed_order() {
		let session = Uuid::new_v4();
		let records = vec![
			record(session, TagCategory::Themes, &["relationships"], NOW, 60),
			record(session, TagCategory::Emotions, &["anxiety"], NOW, 60),
			record(session, TagCategory::ProgressIndicators, &["breakthrough"], NOW, 60),
		];
		let note = Note {
			note_id: Uuid::new_v4(),
			session_id: session,
			client_id: "c".to_string(),
			therapist_id: "t".to_string(),
			content: Some("Things feel better, less hard.".to_string()),
			session_date: NOW,
			created_at: NOW,
		};
		let focus = FocusFilter::default();
		let themes = dominant_themes(&records, &focus, NOW, &journey_cfg());
		let trajectory = emotional_trajectory(std::slice::from_ref(&note), &records, &focus);
		let progress = progress_indicators(&records, &[], &focus, &journey_cfg());

		assert_eq!(trajectory[0].emotions, vec!["anxiety".to_string()]);
		assert_eq!(trajectory[0].sentiment, 0);
		assert_eq!(
			recommendations(&themes, &trajectory, &progress),
			vec![
				ANXIETY_RECOMMENDATION.to_string(),
				BREAKTHROUGH_RECOMMENDATION.to_string(),
				RELATIONSHIPS_RECOMMENDATION.to_string(),
			]
		);
	}

	#[test]
	fn focus_tags_restrict_tag_aggregations() {
		let records = vec![record(
			Uuid::new_v4(),
			TagCategory::Themes,
			&["work", "family"],
			NOW,
			60,
		)];
		let focus = FocusFilter::new(&["  WORK ".to_string()]);
		let themes = dominant_themes(&records, &focus, NOW, &journey_cfg());

		assert_eq!(themes.frequency.keys().collect::<Vec<_>>(), vec!["work"]);
	}
}
