use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use notewise_domain::{excerpt, fuzzy::FuzzyIndex};
use notewise_storage::models::{InsightRecord, Note, TagRecord};

use crate::{
	Error, NotewiseService, Result,
	cache::{self, cache_key_prefix},
	time_serde::Timestamp,
};

#[derive(Debug, Clone, Deserialize)]
pub struct RecallRequest {
	pub therapist_id: String,
	pub client_id: String,
	pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	Note,
	Insight,
	Tag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMatch {
	pub source_id: Uuid,
	pub source_kind: SourceKind,
	pub excerpt: String,
	#[serde(with = "crate::time_serde")]
	pub date: OffsetDateTime,
	/// `1 - distance`, in `[0, 1]`.
	pub relevance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallPatterns {
	/// Notes whose content contains the query.
	pub frequency: u32,
	/// Session dates of those notes, newest first.
	pub timeline: Vec<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallResult {
	pub direct_matches: Vec<DirectMatch>,
	pub related_insights: Vec<String>,
	pub patterns: RecallPatterns,
}

struct Candidate {
	source_id: Uuid,
	source_kind: SourceKind,
	key: String,
	date: OffsetDateTime,
}

impl NotewiseService {
	/// Fuzzy search over a client's notes, insights and tags. Results are cached per
	/// `(therapist_id, client_id, query)` and served unchanged until the entry expires.
	pub async fn search(&self, req: RecallRequest) -> Result<RecallResult> {
		let scope = crate::client_scope(&req.client_id, &req.therapist_id)?;

		if req.query.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let cache_key =
			cache::build_recall_cache_key(&req.therapist_id, &req.client_id, &req.query);

		match cache_key.as_deref() {
			Some(key) =>
				if let Some(cached) = self.cache.get(key) {
					tracing::info!(
						cache_key_prefix = cache_key_prefix(key),
						hit = true,
						matches = cached.direct_matches.len(),
						"Recall cache hit."
					);

					return Ok(cached);
				} else {
					tracing::info!(
						cache_key_prefix = cache_key_prefix(key),
						hit = false,
						ttl_secs = self.cache.ttl().as_secs(),
						"Recall cache miss."
					);
				},
			None => tracing::warn!(client_id = %req.client_id, "Recall cache key build failed."),
		}

		let (notes, insights, tag_records) = tokio::try_join!(
			self.store.search_notes(scope, &req.query),
			self.store.search_insights(scope, &req.query),
			self.store.search_tag_records(scope, &req.query),
		)?;
		let result = self.rank(&req.query, &notes, &insights, &tag_records);

		if let Some(key) = cache_key {
			self.cache.insert(key, result.clone());
		}

		Ok(result)
	}

	fn rank(
		&self,
		query: &str,
		notes: &[Note],
		insights: &[InsightRecord],
		tag_records: &[TagRecord],
	) -> RecallResult {
		let cfg = &self.cfg.recall;
		let candidates = candidates(notes, insights, tag_records);
		let index = FuzzyIndex::new(
			self.scorer.as_ref(),
			candidates.iter().map(|candidate| candidate.key.clone()).collect(),
			cfg.max_fuzzy_distance,
		);
		let direct_matches = index
			.search(query, cfg.max_direct_matches as usize)
			.into_iter()
			.filter_map(|hit| {
				let candidate = candidates.get(hit.index)?;

				Some(DirectMatch {
					source_id: candidate.source_id,
					source_kind: candidate.source_kind,
					excerpt: excerpt::excerpt(
						&candidate.key,
						query,
						cfg.excerpt_radius_chars as usize,
					),
					date: candidate.date,
					relevance: (1.0 - hit.distance).clamp(0.0, 1.0),
				})
			})
			.collect();
		let related_insights = insights
			.iter()
			.take(cfg.max_related_insights as usize)
			.map(|insight| insight.text.clone())
			.collect();
		let content_matches: Vec<&Note> = notes
			.iter()
			.filter(|note| {
				note.content
					.as_deref()
					.is_some_and(|content| excerpt::find_case_insensitive(content, query).is_some())
			})
			.collect();
		let mut timeline: Vec<Timestamp> =
			content_matches.iter().map(|note| note.session_date.into()).collect();

		timeline.sort_by(|a, b| b.cmp(a));
		timeline.truncate(cfg.max_timeline_dates as usize);

		RecallResult {
			direct_matches,
			related_insights,
			patterns: RecallPatterns {
				frequency: u32::try_from(content_matches.len()).unwrap_or(u32::MAX),
				timeline,
			},
		}
	}
}

/// Notes, then insights, then tag records, each keyed by the text a match is excerpted from.
fn candidates(
	notes: &[Note],
	insights: &[InsightRecord],
	tag_records: &[TagRecord],
) -> Vec<Candidate> {
	let notes = notes.iter().map(|note| Candidate {
		source_id: note.note_id,
		source_kind: SourceKind::Note,
		key: note.content.clone().unwrap_or_default(),
		date: note.session_date,
	});
	let insights = insights.iter().map(|insight| Candidate {
		source_id: insight.insight_id,
		source_kind: SourceKind::Insight,
		key: insight.text.clone(),
		date: insight.created_at,
	});
	let tags = tag_records.iter().map(|record| Candidate {
		source_id: record.tag_id,
		source_kind: SourceKind::Tag,
		key: record.tags.as_slice().join(", "),
		date: record.session_date,
	});

	notes.chain(insights).chain(tags).collect()
}
