use std::{future::Future, pin::Pin};

use time::OffsetDateTime;

use crate::{
	Result,
	models::{InsightRecord, JourneySnapshot, NewTagRecord, Note, TagRecord},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Every read is scoped to one client of one therapist.
#[derive(Debug, Clone, Copy)]
pub struct ClientScope<'a> {
	pub client_id: &'a str,
	pub therapist_id: &'a str,
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
	pub start: OffsetDateTime,
	pub end: OffsetDateTime,
}
impl DateRange {
	pub fn contains(&self, at: OffsetDateTime) -> bool {
		self.start <= at && at <= self.end
	}
}

/// Record store boundary. Writes are append-only; substring searches take the raw query and
/// match it literally and case-insensitively.
///
/// Ordering contract:
/// - notes: newest `session_date` first.
/// - tag records from `list_tag_records`: oldest first by `(session_date, created_at)`.
/// - tag records from `search_tag_records`: newest `session_date` first.
/// - insights from `list_insights`: newest first by `(session_date, created_at)`.
/// - insights from `search_insights`: newest `created_at` first.
/// - journeys: newest `synthesized_at` first.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Fails with [`crate::Error::Conflict`] when the session already has a note.
	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>>;

	fn insert_tag_record<'a>(&'a self, record: &'a NewTagRecord) -> BoxFuture<'a, Result<()>>;

	fn insert_insight<'a>(&'a self, insight: &'a InsightRecord) -> BoxFuture<'a, Result<()>>;

	fn insert_journey<'a>(&'a self, snapshot: &'a JourneySnapshot) -> BoxFuture<'a, Result<()>>;

	fn list_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<Note>>>;

	/// Tag records whose note's session date falls in `range`.
	fn list_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>>;

	/// Insights whose note's session date falls in `range`.
	fn list_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>>;

	fn list_journeys<'a>(
		&'a self,
		scope: ClientScope<'a>,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<JourneySnapshot>>>;

	/// Notes whose content, or whose session's serialized tag lists, contain `needle`.
	fn search_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<Note>>>;

	fn search_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>>;

	/// Tag records whose serialized tag list contains `needle`.
	fn search_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>>;
}
