use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{InsightRecord, JourneySnapshot, NewTagRecord, Note, TagRecord},
	queries,
	store::{BoxFuture, ClientScope, DateRange, RecordStore},
};

/// In-process store. Backs the `memory` storage backend and the service tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
	notes: Vec<Note>,
	tags: Vec<NewTagRecord>,
	insights: Vec<InsightRecord>,
	journeys: Vec<JourneySnapshot>,
}
impl Tables {
	fn session_date(
		&self,
		session_id: Uuid,
		client_id: &str,
		therapist_id: &str,
	) -> Option<OffsetDateTime> {
		self.notes
			.iter()
			.find(|note| {
				note.session_id == session_id
					&& note.client_id == client_id
					&& note.therapist_id == therapist_id
			})
			.map(|note| note.session_date)
	}

	fn dated_tags(&self, scope: ClientScope<'_>) -> Vec<TagRecord> {
		self.tags
			.iter()
			.filter(|record| in_scope(scope, &record.client_id, &record.therapist_id))
			.filter_map(|record| {
				let session_date =
					self.session_date(record.session_id, &record.client_id, &record.therapist_id)?;

				Some(TagRecord {
					tag_id: record.tag_id,
					session_id: record.session_id,
					client_id: record.client_id.clone(),
					therapist_id: record.therapist_id.clone(),
					category: record.category,
					tags: record.tags.clone(),
					confidence: record.confidence,
					session_date,
					created_at: record.created_at,
				})
			})
			.collect()
	}

	fn session_tags_match(&self, scope: ClientScope<'_>, session_id: Uuid, needle: &str) -> bool {
		self.tags.iter().any(|record| {
			record.session_id == session_id
				&& in_scope(scope, &record.client_id, &record.therapist_id)
				&& queries::contains_ignore_case(&queries::serialize_tags(&record.tags), needle)
		})
	}
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn read(&self) -> RwLockReadGuard<'_, Tables> {
		self.tables.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, Tables> {
		self.tables.write().unwrap_or_else(|err| err.into_inner())
	}
}

impl RecordStore for MemoryStore {
	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		let result = queries::validate_scope(ClientScope {
			client_id: &note.client_id,
			therapist_id: &note.therapist_id,
		})
		.and_then(|()| {
			let mut tables = self.write();

			if tables
				.session_date(note.session_id, &note.client_id, &note.therapist_id)
				.is_some()
			{
				return Err(Error::Conflict(format!(
					"session already has a note; session_id={}",
					note.session_id
				)));
			}

			tables.notes.push(note.clone());

			Ok(())
		});

		Box::pin(async move { result })
	}

	fn insert_tag_record<'a>(&'a self, record: &'a NewTagRecord) -> BoxFuture<'a, Result<()>> {
		let result = queries::validate_scope(ClientScope {
			client_id: &record.client_id,
			therapist_id: &record.therapist_id,
		})
		.and_then(|()| queries::validate_confidence(record.confidence))
		.map(|()| self.write().tags.push(record.clone()));

		Box::pin(async move { result })
	}

	fn insert_insight<'a>(&'a self, insight: &'a InsightRecord) -> BoxFuture<'a, Result<()>> {
		let result = queries::validate_scope(ClientScope {
			client_id: &insight.client_id,
			therapist_id: &insight.therapist_id,
		})
		.and_then(|()| queries::validate_confidence(insight.confidence))
		.map(|()| self.write().insights.push(insight.clone()));

		Box::pin(async move { result })
	}

	fn insert_journey<'a>(&'a self, snapshot: &'a JourneySnapshot) -> BoxFuture<'a, Result<()>> {
		let result = queries::validate_scope(ClientScope {
			client_id: &snapshot.client_id,
			therapist_id: &snapshot.therapist_id,
		})
		.map(|()| self.write().journeys.push(snapshot.clone()));

		Box::pin(async move { result })
	}

	fn list_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		let mut notes: Vec<Note> = self
			.read()
			.notes
			.iter()
			.filter(|note| in_scope(scope, &note.client_id, &note.therapist_id))
			.filter(|note| range.contains(note.session_date))
			.cloned()
			.collect();

		notes.sort_by(|a, b| b.session_date.cmp(&a.session_date));

		Box::pin(async move { Ok(notes) })
	}

	fn list_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>> {
		let mut records: Vec<TagRecord> = self
			.read()
			.dated_tags(scope)
			.into_iter()
			.filter(|record| range.contains(record.session_date))
			.collect();

		records.sort_by(|a, b| {
			a.session_date.cmp(&b.session_date).then(a.created_at.cmp(&b.created_at))
		});

		Box::pin(async move { Ok(records) })
	}

	fn list_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>> {
		let tables = self.read();
		let mut dated: Vec<(OffsetDateTime, InsightRecord)> = tables
			.insights
			.iter()
			.filter(|insight| in_scope(scope, &insight.client_id, &insight.therapist_id))
			.filter_map(|insight| {
				let session_date = tables.session_date(
					insight.session_id,
					&insight.client_id,
					&insight.therapist_id,
				)?;

				range.contains(session_date).then(|| (session_date, insight.clone()))
			})
			.collect();

		drop(tables);

		dated.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.created_at.cmp(&a.1.created_at)));

		let insights: Vec<InsightRecord> =
			dated.into_iter().map(|(_, insight)| insight).collect();

		Box::pin(async move { Ok(insights) })
	}

	fn list_journeys<'a>(
		&'a self,
		scope: ClientScope<'a>,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<JourneySnapshot>>> {
		let mut journeys: Vec<JourneySnapshot> = self
			.read()
			.journeys
			.iter()
			.filter(|snapshot| in_scope(scope, &snapshot.client_id, &snapshot.therapist_id))
			.cloned()
			.collect();

		journeys.sort_by(|a, b| b.synthesized_at.cmp(&a.synthesized_at));
		journeys.truncate(limit as usize);

		Box::pin(async move { Ok(journeys) })
	}

	fn search_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		let tables = self.read();
		let mut notes: Vec<Note> = tables
			.notes
			.iter()
			.filter(|note| in_scope(scope, &note.client_id, &note.therapist_id))
			.filter(|note| {
				note.content
					.as_deref()
					.map(|content| queries::contains_ignore_case(content, needle))
					.unwrap_or(false) || tables.session_tags_match(scope, note.session_id, needle)
			})
			.cloned()
			.collect();

		drop(tables);

		notes.sort_by(|a, b| b.session_date.cmp(&a.session_date));

		Box::pin(async move { Ok(notes) })
	}

	fn search_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>> {
		let mut insights: Vec<InsightRecord> = self
			.read()
			.insights
			.iter()
			.filter(|insight| in_scope(scope, &insight.client_id, &insight.therapist_id))
			.filter(|insight| queries::contains_ignore_case(&insight.text, needle))
			.cloned()
			.collect();

		insights.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		Box::pin(async move { Ok(insights) })
	}

	fn search_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>> {
		let mut records: Vec<TagRecord> = self
			.read()
			.dated_tags(scope)
			.into_iter()
			.filter(|record| {
				queries::contains_ignore_case(&queries::serialize_tags(&record.tags), needle)
			})
			.collect();

		records.sort_by(|a, b| b.session_date.cmp(&a.session_date));

		Box::pin(async move { Ok(records) })
	}
}

fn in_scope(scope: ClientScope<'_>, client_id: &str, therapist_id: &str) -> bool {
	scope.client_id == client_id && scope.therapist_id == therapist_id
}
