use futures::future;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use notewise_domain::extract::{self, CategoryTags, InsightCandidate};
use notewise_storage::models::{InsightRecord, NewTagRecord};

use crate::{NotewiseService, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct TagRequest {
	pub session_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	pub content: Option<String>,
}

/// Outcome of one extraction run. Write failures are counted here instead of failing the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagReport {
	pub tag_records_written: u32,
	pub insights_written: u32,
	pub failed_writes: u32,
	pub tags: Vec<CategoryTags>,
	pub insights: Vec<InsightCandidate>,
}

impl NotewiseService {
	/// Extracts tags and insights from a note and appends them to the store. Every write is
	/// issued concurrently and a failed write never cancels the others.
	pub async fn tag(&self, req: TagRequest) -> Result<TagReport> {
		let scope = crate::client_scope(&req.client_id, &req.therapist_id)?;
		let text = req.content.as_deref().unwrap_or_default();
		let extracted = extract::extract(text, &self.cfg.extraction);
		let now = OffsetDateTime::now_utc();
		let tag_records: Vec<NewTagRecord> = extracted
			.tags
			.iter()
			.map(|entry| NewTagRecord {
				tag_id: Uuid::new_v4(),
				session_id: req.session_id,
				client_id: scope.client_id.to_string(),
				therapist_id: scope.therapist_id.to_string(),
				category: entry.category,
				tags: entry.tags.clone(),
				confidence: entry.confidence,
				created_at: now,
			})
			.collect();
		let insight_records: Vec<InsightRecord> = extracted
			.insights
			.iter()
			.map(|candidate| InsightRecord {
				insight_id: Uuid::new_v4(),
				session_id: req.session_id,
				client_id: scope.client_id.to_string(),
				therapist_id: scope.therapist_id.to_string(),
				text: candidate.text.clone(),
				insight_type: candidate.insight_type,
				confidence: candidate.confidence,
				created_at: now,
			})
			.collect();
		let (tag_results, insight_results) = future::join(
			future::join_all(tag_records.iter().map(|record| self.store.insert_tag_record(record))),
			future::join_all(
				insight_records.iter().map(|insight| self.store.insert_insight(insight)),
			),
		)
		.await;
		let mut report = TagReport::default();

		for (record, result) in tag_records.iter().zip(tag_results) {
			match result {
				Ok(()) => report.tag_records_written += 1,
				Err(err) => {
					report.failed_writes += 1;

					tracing::warn!(
						error = %err,
						session_id = %req.session_id,
						client_id = %req.client_id,
						category = record.category.as_str(),
						"Tag record write failed."
					);
				},
			}
		}
		for (insight, result) in insight_records.iter().zip(insight_results) {
			match result {
				Ok(()) => report.insights_written += 1,
				Err(err) => {
					report.failed_writes += 1;

					tracing::warn!(
						error = %err,
						session_id = %req.session_id,
						client_id = %req.client_id,
						insight_type = insight.insight_type.as_str(),
						"Insight write failed."
					);
				},
			}
		}

		tracing::info!(
			session_id = %req.session_id,
			client_id = %req.client_id,
			tag_records = report.tag_records_written,
			insights = report.insights_written,
			failed_writes = report.failed_writes,
			"Note tagged."
		);

		report.tags = extracted.tags;
		report.insights = extracted.insights;

		Ok(report)
	}
}
