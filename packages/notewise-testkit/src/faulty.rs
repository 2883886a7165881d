use std::{
	collections::HashSet,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use notewise_storage::{
	BoxFuture, ClientScope, DateRange, MemoryStore, RecordStore, Result,
	models::{InsightRecord, JourneySnapshot, NewTagRecord, Note, TagRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
	InsertNote,
	InsertTagRecord,
	InsertInsight,
	InsertJourney,
	ListNotes,
	ListTagRecords,
	ListInsights,
	ListJourneys,
	SearchNotes,
	SearchInsights,
	SearchTagRecords,
}

/// Wraps a [`MemoryStore`] and fails the operations switched on with [`FaultyStore::fail`].
#[derive(Debug, Default)]
pub struct FaultyStore {
	pub inner: MemoryStore,
	failing: Mutex<HashSet<StoreOp>>,
	search_calls: AtomicUsize,
}
impl FaultyStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail(&self, op: StoreOp) {
		self.failing.lock().unwrap_or_else(|err| err.into_inner()).insert(op);
	}

	pub fn heal(&self, op: StoreOp) {
		self.failing.lock().unwrap_or_else(|err| err.into_inner()).remove(&op);
	}

	/// Number of `search_*` calls that reached the store, failing or not.
	pub fn search_calls(&self) -> usize {
		self.search_calls.load(Ordering::SeqCst)
	}

	fn check(&self, op: StoreOp) -> Result<()> {
		if matches!(op, StoreOp::SearchNotes | StoreOp::SearchInsights | StoreOp::SearchTagRecords)
		{
			self.search_calls.fetch_add(1, Ordering::SeqCst);
		}
		if self.failing.lock().unwrap_or_else(|err| err.into_inner()).contains(&op) {
			return Err(sqlx::Error::PoolTimedOut.into());
		}

		Ok(())
	}
}

fn failed<'a, T>(err: notewise_storage::Error) -> BoxFuture<'a, Result<T>>
where
	T: Send + 'a,
{
	Box::pin(async move { Err(err) })
}

impl RecordStore for FaultyStore {
	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		match self.check(StoreOp::InsertNote) {
			Ok(()) => self.inner.insert_note(note),
			Err(err) => failed(err),
		}
	}

	fn insert_tag_record<'a>(&'a self, record: &'a NewTagRecord) -> BoxFuture<'a, Result<()>> {
		match self.check(StoreOp::InsertTagRecord) {
			Ok(()) => self.inner.insert_tag_record(record),
			Err(err) => failed(err),
		}
	}

	fn insert_insight<'a>(&'a self, insight: &'a InsightRecord) -> BoxFuture<'a, Result<()>> {
		match self.check(StoreOp::InsertInsight) {
			Ok(()) => self.inner.insert_insight(insight),
			Err(err) => failed(err),
		}
	}

	fn insert_journey<'a>(&'a self, snapshot: &'a JourneySnapshot) -> BoxFuture<'a, Result<()>> {
		match self.check(StoreOp::InsertJourney) {
			Ok(()) => self.inner.insert_journey(snapshot),
			Err(err) => failed(err),
		}
	}

	fn list_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		match self.check(StoreOp::ListNotes) {
			Ok(()) => self.inner.list_notes(scope, range),
			Err(err) => failed(err),
		}
	}

	fn list_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>> {
		match self.check(StoreOp::ListTagRecords) {
			Ok(()) => self.inner.list_tag_records(scope, range),
			Err(err) => failed(err),
		}
	}

	fn list_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>> {
		match self.check(StoreOp::ListInsights) {
			Ok(()) => self.inner.list_insights(scope, range),
			Err(err) => failed(err),
		}
	}

	fn list_journeys<'a>(
		&'a self,
		scope: ClientScope<'a>,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<JourneySnapshot>>> {
		match self.check(StoreOp::ListJourneys) {
			Ok(()) => self.inner.list_journeys(scope, limit),
			Err(err) => failed(err),
		}
	}

	fn search_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		match self.check(StoreOp::SearchNotes) {
			Ok(()) => self.inner.search_notes(scope, needle),
			Err(err) => failed(err),
		}
	}

	fn search_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>> {
		match self.check(StoreOp::SearchInsights) {
			Ok(()) => self.inner.search_insights(scope, needle),
			Err(err) => failed(err),
		}
	}

	fn search_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>> {
		match self.check(StoreOp::SearchTagRecords) {
			Ok(()) => self.inner.search_tag_records(scope, needle),
			Err(err) => failed(err),
		}
	}
}
